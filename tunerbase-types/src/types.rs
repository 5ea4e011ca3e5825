//! Value types shared by the tuning layer and its front-ends.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a physical input, unique within one capture card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputId(pub u32);

impl fmt::Display for InputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for InputId {
    fn from(value: u32) -> Self {
        InputId(value)
    }
}

/// One tunable channel within an input's lineup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelDescriptor {
    /// Channel id (unique within the lineup database).
    pub chan_id: u32,
    /// Channel number handed to the hardware or changer ("7", "7_1").
    pub channum: String,
    /// String users type and see ("7", "7-1").
    pub display: String,
    /// Station callsign.
    pub callsign: String,
    /// Content on this channel skips commercial detection.
    pub commercial_free: bool,
    /// Member of the favorite navigation subset.
    pub favorite: bool,
}

impl ChannelDescriptor {
    /// Create a descriptor whose display string equals its channel number.
    pub fn new(chan_id: u32, channum: impl Into<String>) -> Self {
        let channum = channum.into();
        Self {
            chan_id,
            display: channum.clone(),
            channum,
            callsign: String::new(),
            commercial_free: false,
            favorite: false,
        }
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = display.into();
        self
    }

    pub fn with_callsign(mut self, callsign: impl Into<String>) -> Self {
        self.callsign = callsign.into();
        self
    }

    pub fn commercial_free(mut self, value: bool) -> Self {
        self.commercial_free = value;
        self
    }

    pub fn favorite(mut self, value: bool) -> Self {
        self.favorite = value;
        self
    }
}

/// Reference to an external channel-changer configuration.
///
/// The value is the changer command line; the channel number is appended
/// as the last argument when a change is requested.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangerRef(pub String);

impl ChangerRef {
    pub fn new(command: impl Into<String>) -> Self {
        ChangerRef(command.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChangerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Legacy video-standard hints used by analog capture drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HardwareHints {
    /// V4L input index, if the driver exposes one.
    pub input_num: Option<i32>,
    pub video_mode_v4l1: i32,
    pub video_mode_v4l2: i32,
}

/// One physical input of a capture card and its channel set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecord {
    pub id: InputId,
    /// Human-readable input label ("Tuner", "Composite1").
    pub name: String,
    /// Channel tuned on first use of this input (also the remembered last channel).
    pub start_channel: String,
    /// Channel the capture hardware stays parked on while an external changer is used.
    pub tune_to_channel: String,
    pub external_changer: Option<ChangerRef>,
    /// Lineup source feeding this input; 0 means nothing is connected.
    pub source_id: u32,
    /// Owning capture card.
    pub card_id: u32,
    /// Channels in display order. May be empty for an unscanned input.
    pub channels: Vec<ChannelDescriptor>,
    pub hardware_hints: HardwareHints,
}

impl InputRecord {
    pub fn new(id: impl Into<InputId>, name: impl Into<String>, card_id: u32, source_id: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            start_channel: String::new(),
            tune_to_channel: String::new(),
            external_changer: None,
            source_id,
            card_id,
            channels: Vec::new(),
            hardware_hints: HardwareHints::default(),
        }
    }

    pub fn with_start_channel(mut self, channum: impl Into<String>) -> Self {
        self.start_channel = channum.into();
        self
    }

    pub fn with_channels(mut self, channels: Vec<ChannelDescriptor>) -> Self {
        self.channels = channels;
        self
    }

    /// Route channel changes through an external changer while the
    /// hardware stays on `tune_to_channel`.
    pub fn with_external_changer(
        mut self,
        changer: ChangerRef,
        tune_to_channel: impl Into<String>,
    ) -> Self {
        self.external_changer = Some(changer);
        self.tune_to_channel = tune_to_channel.into();
        self
    }

    pub fn with_hardware_hints(mut self, hints: HardwareHints) -> Self {
        self.hardware_hints = hints;
        self
    }

    /// An input is connected when a lineup source feeds it.
    pub fn is_connected(&self) -> bool {
        self.source_id != 0
    }

    pub fn uses_external_changer(&self) -> bool {
        self.external_changer.is_some()
    }

    /// Look up a channel by its channel number.
    pub fn channel(&self, channum: &str) -> Option<&ChannelDescriptor> {
        self.channels.iter().find(|c| c.channum == channum)
    }
}

/// Direction for relative channel changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelChangeDirection {
    Up,
    Down,
    /// Next channel flagged as a favorite, moving up.
    Favorite,
    /// Stay on the same channel.
    Same,
}

impl std::str::FromStr for ChannelChangeDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "favorite" | "fav" => Ok(Self::Favorite),
            "same" => Ok(Self::Same),
            other => Err(format!("unknown channel direction: {}", other)),
        }
    }
}

/// Adjustable picture attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PictureAttribute {
    Brightness,
    Contrast,
    Colour,
    Hue,
    StudioLevels,
    Volume,
}

/// Which stage a picture adjustment applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PictureAdjustType {
    Playback,
    Channel,
    Recording,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_connected() {
        let connected = InputRecord::new(1, "Tuner", 1, 2);
        let disconnected = InputRecord::new(2, "S-Video", 1, 0);

        assert!(connected.is_connected());
        assert!(!disconnected.is_connected());
    }

    #[test]
    fn test_channel_lookup() {
        let input = InputRecord::new(1, "Tuner", 1, 1).with_channels(vec![
            ChannelDescriptor::new(1002, "2"),
            ChannelDescriptor::new(1007, "7_1").with_display("7-1"),
        ]);

        assert_eq!(input.channel("7_1").map(|c| c.chan_id), Some(1007));
        assert_eq!(input.channel("7-1"), None);
    }

    #[test]
    fn test_direction_from_str() {
        assert_eq!("UP".parse::<ChannelChangeDirection>(), Ok(ChannelChangeDirection::Up));
        assert_eq!("fav".parse::<ChannelChangeDirection>(), Ok(ChannelChangeDirection::Favorite));
        assert!("sideways".parse::<ChannelChangeDirection>().is_err());
    }

    #[test]
    fn test_input_record_json() {
        let input = InputRecord::new(3, "Cable", 1, 4)
            .with_start_channel("100")
            .with_external_changer(ChangerRef::new("/usr/bin/changer"), "3");

        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["external_changer"], "/usr/bin/changer");
        assert_eq!(json["tune_to_channel"], "3");
    }
}
