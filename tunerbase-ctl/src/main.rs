//! tunerbase-ctl: Command line front-end for tunerbase.
//!
//! Inspects and drives the tuning session of one capture card, and manages
//! the card, input and channel tables in the tuning database.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, error};
use serde::Serialize;
use tunerbase::database::{NewCard, NewChannel, NewInput};
use tunerbase::{ChannelChangeDirection, Database, HardwareFamily};

mod commands;
mod config;
mod logging;

use config::{Overrides, Settings};

/// tunerbase-ctl - Inspect and drive capture card tuning
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Capture card id
    #[arg(short = 'n', long)]
    card: Option<u32>,

    /// Hardware family (dummy, analog, atsc, dvb, composite)
    #[arg(long)]
    family: Option<HardwareFamily>,

    /// Device path or name of the card
    #[arg(long)]
    device: Option<String>,

    /// Extra attempts after a failed external changer request
    #[arg(long)]
    changer_retries: Option<u32>,

    /// Path to the database file
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Configuration file path
    #[arg(short = 'f', long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    output: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Directory where log files are stored
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Number of days to keep log files
    #[arg(long)]
    log_retention_days: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable table format
    Table,
    /// JSON format
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the card's inputs
    Inputs,
    /// List the channels of an input
    Channels {
        /// Input name (default: current input)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Find the input carrying a channel
    Check { channum: String },
    /// Tune a channel
    Tune {
        channum: String,
        /// Input to tune on (default: current input)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Switch to an input
    Switch {
        input: String,
        /// Channel to tune instead of the input's start channel
        #[arg(short, long)]
        channel: Option<String>,
    },
    /// Move from the current input's start channel (up, down, fav, same)
    Step { direction: ChannelChangeDirection },
    /// Switch to the next connected input
    NextInput,
    /// Rename a channel number within a lineup source
    Renumber {
        #[arg(long)]
        source: u32,
        old: String,
        new: String,
    },
    /// Manage the tuning database
    #[command(subcommand)]
    Db(DbCommand),
}

#[derive(Subcommand, Debug)]
enum DbCommand {
    /// List registered cards
    Cards,
    /// Register the card given by --card
    AddCard,
    /// Remove the card given by --card with its inputs
    RemoveCard,
    /// Add an input to the card given by --card
    AddInput {
        name: String,
        /// Lineup source (0 = not connected)
        #[arg(long, default_value = "0")]
        source: u32,
        #[arg(long, default_value = "")]
        start: String,
        /// External changer command; the channel number is appended
        #[arg(long)]
        changer: Option<String>,
        /// Channel the card stays on while the changer is used
        #[arg(long, default_value = "")]
        tune_to: String,
        #[arg(long, default_value = "0")]
        order: i32,
    },
    /// Remove an input from the card given by --card
    RemoveInput { name: String },
    /// Change the lineup source of an input (0 disconnects it)
    SetSource { name: String, source: u32 },
    /// Add a channel to a lineup source
    AddChannel {
        chan_id: u32,
        channum: String,
        #[arg(long)]
        source: u32,
        #[arg(long)]
        display: Option<String>,
        #[arg(long)]
        callsign: Option<String>,
        #[arg(long)]
        favorite: bool,
        #[arg(long)]
        commercial_free: bool,
        #[arg(long, default_value = "0")]
        order: i32,
    },
    /// Mark a channel as favorite
    Favorite {
        chan_id: u32,
        /// Remove the mark instead
        #[arg(long)]
        off: bool,
    },
    /// Hide a channel from its lineup
    Hide {
        chan_id: u32,
        /// Show the channel again
        #[arg(long)]
        off: bool,
    },
    /// Remove a channel
    RemoveChannel { chan_id: u32 },
}

fn print_report<T>(format: OutputFormat, report: &T) -> Result<(), Box<dyn std::error::Error>>
where
    T: Serialize + std::fmt::Display,
{
    match format {
        OutputFormat::Table => print!("{}", report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct Created {
    kind: &'static str,
    id: u32,
}

impl std::fmt::Display for Created {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Created {} {}", self.kind, self.id)
    }
}

fn run_db_command(
    command: DbCommand,
    settings: &Settings,
    db: &Database,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let card_id = settings.session.card_id;
    let created = match command {
        DbCommand::Cards => return print_report(format, &commands::list_cards(db)?),
        DbCommand::AddCard => {
            let card = NewCard::new(card_id, settings.family.name()).with_device(settings.device.clone());
            Created {
                kind: "card",
                id: commands::add_card(db, &card)?,
            }
        }
        DbCommand::AddInput {
            name,
            source,
            start,
            changer,
            tune_to,
            order,
        } => {
            let mut input = NewInput::new(card_id, name, source)
                .with_start_channel(start)
                .with_display_order(order);
            if let Some(changer) = changer {
                input = input.with_external_changer(changer, tune_to);
            }
            Created {
                kind: "input",
                id: commands::add_input(db, &input)?,
            }
        }
        DbCommand::AddChannel {
            chan_id,
            channum,
            source,
            display,
            callsign,
            favorite,
            commercial_free,
            order,
        } => {
            let mut channel = NewChannel::new(chan_id, source, channum)
                .favorite(favorite)
                .commercial_free(commercial_free)
                .with_sort_order(order);
            if let Some(display) = display {
                channel = channel.with_display(display);
            }
            if let Some(callsign) = callsign {
                channel = channel.with_callsign(callsign);
            }
            Created {
                kind: "channel",
                id: commands::add_channel(db, &channel)?,
            }
        }
        DbCommand::Favorite { chan_id, off } => {
            commands::set_favorite(db, chan_id, !off)?;
            return Ok(());
        }
        DbCommand::Hide { chan_id, off } => {
            commands::set_visible(db, chan_id, off)?;
            return Ok(());
        }
        DbCommand::RemoveCard => {
            commands::remove_card(db, card_id)?;
            return Ok(());
        }
        DbCommand::RemoveInput { name } => {
            commands::remove_input(db, card_id, &name)?;
            return Ok(());
        }
        DbCommand::SetSource { name, source } => {
            commands::set_input_source(db, card_id, &name, source)?;
            return Ok(());
        }
        DbCommand::RemoveChannel { chan_id } => {
            commands::remove_channel(db, chan_id)?;
            return Ok(());
        }
    };
    print_report(format, &created)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load config file: explicit path > auto-detect > default
    let file_config = match config::resolve_config_path(args.config.clone()) {
        Some(path) => config::load_config(&path).map_err(|e| {
            eprintln!("Failed to load config file {}: {}", path.display(), e);
            e
        })?,
        None => config::ConfigFile::default(),
    };

    // Command line takes precedence
    let settings = Settings::merge(
        file_config,
        Overrides {
            card_id: args.card,
            family: args.family,
            device: args.device.clone(),
            changer_retries: args.changer_retries,
            database: args.database.clone(),
            log_dir: args.log_dir.clone(),
            log_retention_days: args.log_retention_days,
        },
    );

    logging::init_logging(
        &settings.log_dir,
        settings.log_retention_days,
        args.verbose,
        settings.log_level.as_deref(),
    )?;
    debug!("Settings: {:?}", settings);

    let db = Database::open(&settings.database).map_err(|e| {
        error!("Failed to open database {:?}: {}", settings.database, e);
        e
    })?;

    let format = args.output;
    match args.command {
        Command::Inputs => print_report(format, &commands::list_inputs(&settings, db)?)?,
        Command::Channels { input } => {
            print_report(format, &commands::list_channels(&settings, db, input.as_deref())?)?
        }
        Command::Check { channum } => print_report(format, &commands::check(&settings, db, &channum)?)?,
        Command::Tune { channum, input } => print_report(
            format,
            &commands::tune(&settings, db, &channum, input.as_deref())?,
        )?,
        Command::Switch { input, channel } => print_report(
            format,
            &commands::switch(&settings, db, &input, channel.as_deref())?,
        )?,
        Command::Step { direction } => print_report(format, &commands::step(&settings, db, direction)?)?,
        Command::NextInput => print_report(format, &commands::next_input(&settings, db)?)?,
        Command::Renumber { source, old, new } => print_report(
            format,
            &commands::renumber(&settings, db, source, &old, &new)?,
        )?,
        Command::Db(command) => run_db_command(command, &settings, &db, format)?,
    }

    Ok(())
}
