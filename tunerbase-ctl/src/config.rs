//! Configuration file format and merging with command line arguments.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tunerbase::{HardwareFamily, SessionConfig};

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "tunerbase.toml";

const DEFAULT_DATABASE: &str = "tunerbase.db";
const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_RETENTION_DAYS: u64 = 7;

/// Configuration file format.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub card: CardSection,
    #[serde(default)]
    pub database: DatabaseSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Deserialize, Default)]
pub struct CardSection {
    pub id: Option<u32>,
    pub family: Option<HardwareFamily>,
    pub device: Option<String>,
    pub changer_retries: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
pub struct DatabaseSection {
    pub path: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct LoggingSection {
    pub log_dir: Option<String>,
    pub retention_days: Option<u64>,
    pub level: Option<String>,
}

/// Values given on the command line. `None` defers to the file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub card_id: Option<u32>,
    pub family: Option<HardwareFamily>,
    pub device: Option<String>,
    pub changer_retries: Option<u32>,
    pub database: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub log_retention_days: Option<u64>,
}

/// Effective settings after merging.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub session: SessionConfig,
    pub family: HardwareFamily,
    pub device: String,
    pub database: PathBuf,
    pub log_dir: PathBuf,
    pub log_retention_days: u64,
    pub log_level: Option<String>,
}

impl Settings {
    /// Merge file values under command line values.
    pub fn merge(file: ConfigFile, cli: Overrides) -> Self {
        let defaults = SessionConfig::default();
        let family = cli.family.or(file.card.family).unwrap_or_default();

        Settings {
            session: SessionConfig {
                card_id: cli.card_id.or(file.card.id).unwrap_or(defaults.card_id),
                changer_retries: cli
                    .changer_retries
                    .or(file.card.changer_retries)
                    .unwrap_or(defaults.changer_retries),
            },
            family,
            device: cli
                .device
                .or(file.card.device)
                .unwrap_or_else(|| family.name().to_string()),
            database: cli
                .database
                .or_else(|| file.database.path.map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE)),
            log_dir: cli
                .log_dir
                .or_else(|| file.logging.log_dir.map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR)),
            log_retention_days: cli
                .log_retention_days
                .or(file.logging.retention_days)
                .unwrap_or(DEFAULT_RETENTION_DAYS),
            log_level: file.logging.level,
        }
    }
}

pub fn load_config(path: &Path) -> Result<ConfigFile, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)?;
    let config: ConfigFile = toml::from_str(&contents)?;
    Ok(config)
}

/// Config file to read: explicit path, else `tunerbase.toml` if present.
pub fn resolve_config_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    explicit.or_else(|| {
        let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            Some(default_path)
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[card]
id = 3
family = "dvb"
device = "/dev/dvb/adapter0/frontend0"
changer_retries = 2

[database]
path = "/var/lib/tunerbase/tunerbase.db"

[logging]
log_dir = "/var/log/tunerbase"
retention_days = 14
level = "debug"
"#;

    #[test]
    fn test_parse_config_file() {
        let config: ConfigFile = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.card.id, Some(3));
        assert_eq!(config.card.family, Some(HardwareFamily::Dvb));
        assert_eq!(config.logging.retention_days, Some(14));
        assert_eq!(config.database.path.as_deref(), Some("/var/lib/tunerbase/tunerbase.db"));
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: ConfigFile = toml::from_str("").unwrap();
        let settings = Settings::merge(config, Overrides::default());

        assert_eq!(settings.session, SessionConfig::default());
        assert_eq!(settings.family, HardwareFamily::Dummy);
        assert_eq!(settings.device, "dummy");
        assert_eq!(settings.database, PathBuf::from("tunerbase.db"));
        assert_eq!(settings.log_dir, PathBuf::from("logs"));
        assert_eq!(settings.log_retention_days, 7);
        assert_eq!(settings.log_level, None);
    }

    #[test]
    fn test_cli_takes_precedence() {
        let config: ConfigFile = toml::from_str(SAMPLE).unwrap();
        let cli = Overrides {
            card_id: Some(5),
            database: Some(PathBuf::from("local.db")),
            ..Default::default()
        };
        let settings = Settings::merge(config, cli);

        assert_eq!(settings.session.card_id, 5);
        assert_eq!(settings.session.changer_retries, 2);
        assert_eq!(settings.family, HardwareFamily::Dvb);
        assert_eq!(settings.device, "/dev/dvb/adapter0/frontend0");
        assert_eq!(settings.database, PathBuf::from("local.db"));
        assert_eq!(settings.log_dir, PathBuf::from("/var/log/tunerbase"));
        assert_eq!(settings.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_unknown_family_is_rejected() {
        let result: Result<ConfigFile, _> = toml::from_str("[card]\nfamily = \"isdb\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_explicit_config_path_wins() {
        let path = PathBuf::from("/etc/tunerbase/custom.toml");
        assert_eq!(resolve_config_path(Some(path.clone())), Some(path));
    }
}
