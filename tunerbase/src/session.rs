//! Tuning session: the uniform contract a scheduler drives for one card.
//!
//! A session owns the card's [`InputRegistry`], its hardware and its
//! persistence gateway. It is driven from a single thread; nothing here
//! locks, and hooks may block on device I/O.
//!
//! ```text
//!  Closed --open()--> Open --set_channel_by_string()--> Tuned
//!    ^                 |                                  |
//!    +----close()------+-------------close()--------------+
//! ```

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use tunerbase_types::{
    ChannelChangeDirection, ChannelDescriptor, InputId, InputRecord, PictureAdjustType,
    PictureAttribute, TuningError,
};

use crate::changer::{ChangerTransport, ExternalChangerBridge};
use crate::hardware::{ChannelHardware, DeviceFd};
use crate::input::InputRegistry;
use crate::navigator::ChannelNavigator;
use crate::store::InputStore;

/// Per-card session settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Capture card this session drives.
    pub card_id: u32,
    /// Extra attempts after a failed external-changer request.
    pub changer_retries: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            card_id: 1,
            changer_retries: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    /// Hardware open, no channel committed on the active input.
    Open,
    Tuned,
}

impl SessionState {
    pub fn is_open(self) -> bool {
        self != SessionState::Closed
    }
}

/// One card's tuning state and the hardware behind it.
pub struct TuningSession<H: ChannelHardware, S: InputStore> {
    pub(crate) hardware: H,
    pub(crate) store: S,
    pub(crate) changer: ExternalChangerBridge,
    pub(crate) config: SessionConfig,
    pub(crate) inputs: InputRegistry,
    pub(crate) state: SessionState,
    pub(crate) current_input: Option<InputId>,
    pub(crate) current_channel: String,
    pub(crate) commercial_free: bool,
}

impl<H: ChannelHardware, S: InputStore> TuningSession<H, S> {
    /// Create a closed session. External changers run as commands until
    /// another transport is supplied.
    pub fn new(config: SessionConfig, hardware: H, store: S) -> Self {
        Self {
            hardware,
            store,
            changer: ExternalChangerBridge::default(),
            config,
            inputs: InputRegistry::new(),
            state: SessionState::Closed,
            current_input: None,
            current_channel: String::new(),
            commercial_free: false,
        }
    }

    pub fn with_changer_transport<T>(mut self, transport: T) -> Self
    where
        T: ChangerTransport + Send + 'static,
    {
        self.changer = ExternalChangerBridge::new(transport);
        self
    }

    /// (Re)load the card's inputs from the store.
    ///
    /// A failed read counts as zero inputs. The stored default input becomes
    /// the current input, falling back to the first connected one. Returns
    /// the number of inputs.
    pub fn initialize_inputs(&mut self) -> Result<usize, TuningError> {
        let card_id = self.config.card_id;
        let records = self.store.load_inputs(card_id).unwrap_or_else(|e| {
            error!("Failed to load inputs for card {}: {}", card_id, e);
            Vec::new()
        });

        self.inputs = InputRegistry::from_records(records);
        self.current_input = None;
        self.current_channel.clear();
        self.commercial_free = false;
        if self.state == SessionState::Tuned {
            self.state = SessionState::Open;
        }

        if self.inputs.is_empty() {
            error!("No inputs configured for card {}", card_id);
            return Err(TuningError::NoInputs(card_id));
        }

        for input in self.inputs.iter() {
            if input.is_connected() && input.channels.is_empty() {
                warn!(
                    "Input '{}' on card {} has no channels (source {})",
                    input.name, card_id, input.source_id
                );
            }
        }

        let default_input = self
            .store
            .load_default_input(card_id)
            .unwrap_or_else(|e| {
                warn!("Failed to load default input for card {}: {}", card_id, e);
                None
            })
            .and_then(|name| self.inputs.lookup_by_name(&name));
        self.current_input = default_input
            .or_else(|| self.inputs.first_connected())
            .or_else(|| self.inputs.first());

        info!(
            "Card {}: {} input(s), current input {:?}",
            card_id,
            self.inputs.len(),
            self.current_input_name()
        );
        Ok(self.inputs.len())
    }

    /// Open the hardware, loading inputs first if none are loaded, and
    /// select the current input on it.
    ///
    /// A card without inputs is unusable: the hardware is closed again and
    /// [`TuningError::NoInputs`] is returned.
    pub fn open(&mut self) -> Result<(), TuningError> {
        if self.is_open() {
            return Ok(());
        }

        self.hardware.open().map_err(|e| {
            error!("Failed to open {}: {}", self.describe_device(), e);
            e
        })?;

        if self.inputs.is_empty() {
            if let Err(e) = self.initialize_inputs() {
                self.hardware.close();
                return Err(e);
            }
        }

        if let Some(input) = self.current_input.and_then(|id| self.inputs.get(id)) {
            if let Err(e) = self.hardware.switch_input(input, false) {
                error!("Failed to select input '{}' on {}: {}", input.name, self.describe_device(), e);
                self.hardware.close();
                return Err(e);
            }
            if !self.current_channel.is_empty() && !input.uses_external_changer() {
                if let Err(e) = self.hardware.set_channel(input, &self.current_channel) {
                    warn!("Could not restore channel {} on '{}': {}", self.current_channel, input.name, e);
                    self.current_channel.clear();
                    self.commercial_free = false;
                }
            }
        }

        self.state = if self.current_channel.is_empty() {
            SessionState::Open
        } else {
            SessionState::Tuned
        };
        info!("Opened {}", self.describe_device());
        Ok(())
    }

    pub fn close(&mut self) {
        if self.state.is_open() {
            self.hardware.close();
            info!("Closed {}", self.describe_device());
        }
        self.state = SessionState::Closed;
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open() && self.hardware.is_open()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Tune `chan` (a channel number) on the current input.
    ///
    /// On inputs with an external changer the capture hardware stays parked
    /// and the changer performs the change, retried up to
    /// [`SessionConfig::changer_retries`] times. Nothing is committed on
    /// failure.
    pub fn set_channel_by_string(&mut self, chan: &str) -> Result<(), TuningError> {
        self.ensure_open()?;
        let input_id = self
            .current_input
            .ok_or_else(|| TuningError::UnknownInput("no input selected".to_string()))?;
        let input = self
            .inputs
            .get(input_id)
            .ok_or_else(|| TuningError::UnknownInput(input_id.to_string()))?;
        let commercial_free = input
            .channel(chan)
            .ok_or_else(|| TuningError::UnknownChannel(chan.to_string()))?
            .commercial_free;

        if input.uses_external_changer() {
            if !input.tune_to_channel.is_empty() {
                self.hardware.set_channel(input, &input.tune_to_channel)?;
            }
            let attempts = self.config.changer_retries.saturating_add(1);
            let mut attempt = 1;
            loop {
                match self.changer.change_channel(input, chan) {
                    Ok(()) => break,
                    Err(e) if attempt < attempts && e.is_transient() => {
                        warn!(
                            "Changer attempt {}/{} for channel {} failed: {}",
                            attempt, attempts, chan, e
                        );
                        attempt += 1;
                    }
                    Err(e) => return Err(e),
                }
            }
        } else {
            self.hardware.set_channel(input, chan).map_err(|e| {
                warn!("Tune to {} on '{}' failed: {}", chan, input.name, e);
                e
            })?;
        }

        debug!("Committed channel {} (commercial free: {})", chan, commercial_free);
        self.current_channel = chan.to_string();
        self.commercial_free = commercial_free;
        self.state = SessionState::Tuned;
        Ok(())
    }

    /// Move from the current channel in `direction` and tune the result.
    pub fn set_channel_by_direction(
        &mut self,
        direction: ChannelChangeDirection,
    ) -> Result<(), TuningError> {
        let input = self.current_input_record()?;
        let navigator = ChannelNavigator::for_input(input);
        let next_id = navigator.next_channel_by_number(&self.current_channel, direction)?;
        let channum = navigator
            .find_by_id(next_id)
            .map(|c| c.channum.clone())
            .ok_or_else(|| TuningError::UnknownChannel(format!("chanid {}", next_id)))?;
        self.set_channel_by_string(&channum)
    }

    /// Channel id reached from `chan_id` on the current input.
    pub fn get_next_channel(
        &self,
        chan_id: u32,
        direction: ChannelChangeDirection,
    ) -> Result<u32, TuningError> {
        ChannelNavigator::for_input(self.current_input_record()?).next_channel(chan_id, direction)
    }

    /// Channel id reached from channel number `channum` on the current input.
    pub fn get_next_channel_by_number(
        &self,
        channum: &str,
        direction: ChannelChangeDirection,
    ) -> Result<u32, TuningError> {
        ChannelNavigator::for_input(self.current_input_record()?)
            .next_channel_by_number(channum, direction)
    }

    /// Name of the first connected input carrying `channum`, checking the
    /// current input first. Does not touch session state.
    pub fn check_channel(&self, channum: &str) -> Option<String> {
        let current = self.current_input.and_then(|id| self.inputs.get(id));
        current
            .into_iter()
            .chain(self.inputs.iter())
            .filter(|input| input.is_connected())
            .find(|input| input.channel(channum).is_some())
            .map(|input| input.name.clone())
    }

    /// Remember the current channel as the current input's start channel and
    /// persist the registry and default input.
    pub fn store_input_channels(&mut self) -> Result<(), TuningError> {
        if let Some(id) = self.current_input {
            if !self.current_channel.is_empty() {
                if let Some(record) = self.inputs.get_mut(id) {
                    record.start_channel = self.current_channel.clone();
                }
            }
        }

        self.persist_inputs()?;

        if let Some(name) = self
            .current_input
            .and_then(|id| self.inputs.get(id))
            .map(|r| r.name.as_str())
        {
            self.store
                .store_default_input(self.config.card_id, name)
                .map_err(|e| {
                    error!("Failed to store default input '{}': {}", name, e);
                    TuningError::Store(e.to_string())
                })?;
        }
        Ok(())
    }

    /// Rename channel `old_channum` to `new_channum` on every input fed by
    /// `source_id`, including start channels and the current channel, then
    /// persist the inputs.
    pub fn renumber(
        &mut self,
        source_id: u32,
        old_channum: &str,
        new_channum: &str,
    ) -> Result<(), TuningError> {
        if old_channum.is_empty() {
            return Err(TuningError::UnknownChannel(String::new()));
        }

        for record in self.inputs.records_mut().filter(|r| r.source_id == source_id) {
            if record.start_channel == old_channum {
                record.start_channel = new_channum.to_string();
            }
            for channel in record.channels.iter_mut().filter(|c| c.channum == old_channum) {
                channel.channum = new_channum.to_string();
                if channel.display == old_channum {
                    channel.display = new_channum.to_string();
                }
            }
        }

        if self.current_source_id() == Some(source_id) && self.current_channel == old_channum {
            self.current_channel = new_channum.to_string();
        }

        info!(
            "Renumbered channel {} -> {} on source {}",
            old_channum, new_channum, source_id
        );
        self.persist_inputs()
    }

    pub fn current_input_id(&self) -> Option<InputId> {
        self.current_input
    }

    pub fn current_input(&self) -> Option<&InputRecord> {
        self.current_input.and_then(|id| self.inputs.get(id))
    }

    pub fn current_input_name(&self) -> Option<&str> {
        self.current_input().map(|r| r.name.as_str())
    }

    /// Channel number last committed; empty until the active input is tuned.
    pub fn current_channel_name(&self) -> &str {
        &self.current_channel
    }

    /// Channel id of the current channel.
    pub fn get_chan_id(&self) -> Option<u32> {
        self.current_input()?
            .channel(&self.current_channel)
            .map(|c| c.chan_id)
    }

    pub fn current_source_id(&self) -> Option<u32> {
        self.current_input().map(|r| r.source_id)
    }

    /// True iff the current channel skips commercial detection.
    pub fn is_commercial_free(&self) -> bool {
        self.commercial_free
    }

    pub fn card_id(&self) -> u32 {
        self.config.card_id
    }

    /// Point the session at another card; takes effect at the next
    /// [`initialize_inputs`](Self::initialize_inputs).
    pub fn set_card_id(&mut self, card_id: u32) {
        self.config.card_id = card_id;
    }

    pub fn input_by_name(&self, name: &str) -> Option<InputId> {
        self.inputs.lookup_by_name(name)
    }

    pub fn input_by_num(&self, id: InputId) -> Option<&str> {
        self.inputs.get(id).map(|r| r.name.as_str())
    }

    pub fn input_card_id(&self, id: InputId) -> Option<u32> {
        self.inputs.get(id).map(|r| r.card_id)
    }

    pub fn channels(&self, id: InputId) -> Option<&[ChannelDescriptor]> {
        self.inputs.get(id).map(|r| r.channels.as_slice())
    }

    pub fn channels_by_name(&self, name: &str) -> Option<&[ChannelDescriptor]> {
        self.input_by_name(name).and_then(|id| self.channels(id))
    }

    pub fn connected_inputs(&self) -> Vec<&str> {
        self.inputs.connected_names()
    }

    pub fn inputs(&self) -> &InputRegistry {
        &self.inputs
    }

    /// Channels across all inputs.
    pub fn all_channels(&self) -> impl Iterator<Item = (&InputRecord, &ChannelDescriptor)> + '_ {
        self.inputs.all_channels()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn hardware(&self) -> &H {
        &self.hardware
    }

    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hardware
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn device(&self) -> String {
        self.hardware.device()
    }

    pub fn fd(&self) -> Option<DeviceFd> {
        self.hardware.fd()
    }

    pub fn set_fd(&mut self, fd: DeviceFd) {
        self.hardware.set_fd(fd)
    }

    pub fn retune(&mut self) -> Result<(), TuningError> {
        self.ensure_open()?;
        self.hardware.retune()
    }

    pub fn init_picture_attributes(&mut self) -> bool {
        self.hardware.init_picture_attributes()
    }

    pub fn picture_attribute(&self, attr: PictureAttribute) -> Option<i32> {
        self.hardware.picture_attribute(attr)
    }

    pub fn change_picture_attribute(
        &mut self,
        adjust: PictureAdjustType,
        attr: PictureAttribute,
        up: bool,
    ) -> Option<i32> {
        self.hardware.change_picture_attribute(adjust, attr, up)
    }

    pub(crate) fn ensure_open(&self) -> Result<(), TuningError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(TuningError::NotOpen)
        }
    }

    fn current_input_record(&self) -> Result<&InputRecord, TuningError> {
        self.current_input()
            .ok_or_else(|| TuningError::UnknownInput("no input selected".to_string()))
    }

    fn persist_inputs(&mut self) -> Result<(), TuningError> {
        self.store.store_input_channels(&self.inputs).map_err(|e| {
            error!("Failed to store input channels for card {}: {}", self.config.card_id, e);
            TuningError::Store(e.to_string())
        })
    }

    fn describe_device(&self) -> String {
        let device = self.hardware.device();
        if device.is_empty() {
            format!("card {}", self.config.card_id)
        } else {
            format!("card {} ({})", self.config.card_id, device)
        }
    }
}

impl<H: ChannelHardware, S: InputStore> Drop for TuningSession<H, S> {
    fn drop(&mut self) {
        if self.state.is_open() {
            self.hardware.close();
        }
    }
}
