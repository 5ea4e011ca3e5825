//! Database model definitions.

use tunerbase_types::{ChangerRef, ChannelDescriptor, HardwareHints, InputRecord};

/// Capture card record from database.
#[derive(Debug, Clone)]
pub struct CaptureCardRecord {
    pub id: u32,
    pub family: String,
    pub device: Option<String>,
    pub default_input: Option<String>,
    // Metadata
    pub created_at: i64,
    pub updated_at: i64,
}

/// Card input record from database.
#[derive(Debug, Clone)]
pub struct CardInputRecord {
    pub id: u32,
    pub card_id: u32,
    pub input_name: String,
    pub source_id: u32,
    pub start_channel: String,
    pub tune_to_channel: String,
    pub external_changer: Option<String>,
    // Driver hints
    pub input_num: Option<i32>,
    pub video_mode_v4l1: i32,
    pub video_mode_v4l2: i32,
    // Navigation
    pub display_order: i32,
    pub last_used: Option<i64>,
    // Metadata
    pub created_at: i64,
    pub updated_at: i64,
}

impl CardInputRecord {
    /// Convert to an [`InputRecord`] carrying `channels`.
    pub fn to_input_record(&self, channels: Vec<ChannelDescriptor>) -> InputRecord {
        let mut record = InputRecord::new(self.id, self.input_name.clone(), self.card_id, self.source_id)
            .with_start_channel(self.start_channel.clone())
            .with_channels(channels)
            .with_hardware_hints(HardwareHints {
                input_num: self.input_num,
                video_mode_v4l1: self.video_mode_v4l1,
                video_mode_v4l2: self.video_mode_v4l2,
            });
        if let Some(changer) = self.external_changer.as_deref().filter(|c| !c.is_empty()) {
            record = record.with_external_changer(ChangerRef::new(changer), self.tune_to_channel.clone());
        } else {
            record.tune_to_channel = self.tune_to_channel.clone();
        }
        record
    }
}

/// Channel record from database.
#[derive(Debug, Clone)]
pub struct ChannelRecord {
    pub chan_id: u32,
    pub source_id: u32,
    pub channum: String,
    pub display: Option<String>,
    pub callsign: Option<String>,
    // Flags
    pub commercial_free: bool,
    pub favorite: bool,
    pub visible: bool,
    pub sort_order: i32,
    // Metadata
    pub created_at: i64,
    pub updated_at: i64,
}

impl ChannelRecord {
    /// Convert to a [`ChannelDescriptor`]. A missing display string falls
    /// back to the channel number.
    pub fn to_descriptor(&self) -> ChannelDescriptor {
        let mut descriptor = ChannelDescriptor::new(self.chan_id, self.channum.clone())
            .commercial_free(self.commercial_free)
            .favorite(self.favorite);
        if let Some(display) = self.display.as_deref().filter(|d| !d.is_empty()) {
            descriptor = descriptor.with_display(display);
        }
        if let Some(callsign) = &self.callsign {
            descriptor = descriptor.with_callsign(callsign.clone());
        }
        descriptor
    }
}

/// New capture card to insert.
#[derive(Debug, Clone)]
pub struct NewCard {
    pub id: u32,
    pub family: String,
    pub device: Option<String>,
}

impl NewCard {
    pub fn new(id: u32, family: impl Into<String>) -> Self {
        Self {
            id,
            family: family.into(),
            device: None,
        }
    }

    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }
}

/// New card input to insert.
#[derive(Debug, Clone, Default)]
pub struct NewInput {
    pub card_id: u32,
    pub name: String,
    pub source_id: u32,
    pub start_channel: String,
    pub tune_to_channel: String,
    pub external_changer: Option<String>,
    pub hints: HardwareHints,
    pub display_order: i32,
}

impl NewInput {
    pub fn new(card_id: u32, name: impl Into<String>, source_id: u32) -> Self {
        Self {
            card_id,
            name: name.into(),
            source_id,
            ..Default::default()
        }
    }

    pub fn with_start_channel(mut self, channum: impl Into<String>) -> Self {
        self.start_channel = channum.into();
        self
    }

    pub fn with_external_changer(
        mut self,
        command: impl Into<String>,
        tune_to_channel: impl Into<String>,
    ) -> Self {
        self.external_changer = Some(command.into());
        self.tune_to_channel = tune_to_channel.into();
        self
    }

    pub fn with_display_order(mut self, order: i32) -> Self {
        self.display_order = order;
        self
    }
}

/// New channel to insert.
#[derive(Debug, Clone, Default)]
pub struct NewChannel {
    pub chan_id: u32,
    pub source_id: u32,
    pub channum: String,
    pub display: Option<String>,
    pub callsign: Option<String>,
    pub commercial_free: bool,
    pub favorite: bool,
    pub sort_order: i32,
}

impl NewChannel {
    pub fn new(chan_id: u32, source_id: u32, channum: impl Into<String>) -> Self {
        Self {
            chan_id,
            source_id,
            channum: channum.into(),
            ..Default::default()
        }
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    pub fn with_callsign(mut self, callsign: impl Into<String>) -> Self {
        self.callsign = Some(callsign.into());
        self
    }

    pub fn favorite(mut self, value: bool) -> Self {
        self.favorite = value;
        self
    }

    pub fn commercial_free(mut self, value: bool) -> Self {
        self.commercial_free = value;
        self
    }

    pub fn with_sort_order(mut self, order: i32) -> Self {
        self.sort_order = order;
        self
    }
}
