//! Input switching for [`TuningSession`].
//!
//! Switching has two commit points: the hardware switch commits the new
//! current input, and the following tune commits the channel. A failed tune
//! leaves the switch in place so the caller can retry tuning alone.

use log::{info, warn};
use tunerbase_types::{InputId, TuningError};

use crate::hardware::ChannelHardware;
use crate::session::{SessionState, TuningSession};
use crate::store::InputStore;

impl<H: ChannelHardware, S: InputStore> TuningSession<H, S> {
    /// Switch to input `name` and tune its start channel.
    pub fn switch_to_input(&mut self, name: &str) -> Result<(), TuningError> {
        let id = self.commit_switch(name, true)?;
        let start = self
            .inputs
            .get(id)
            .map(|r| r.start_channel.clone())
            .unwrap_or_default();
        if start.is_empty() {
            warn!("Input '{}' has no start channel", name);
            return Ok(());
        }
        self.set_channel_by_string(&start)
    }

    /// Switch to input `name` and tune `channel` instead of its start channel.
    pub fn switch_to_input_with_channel(
        &mut self,
        name: &str,
        channel: &str,
    ) -> Result<(), TuningError> {
        self.commit_switch(name, false)?;
        self.set_channel_by_string(channel)
    }

    /// Connected input following the current one, wrapping past the end.
    /// Does not switch.
    pub fn next_input(&self) -> Option<InputId> {
        self.inputs.next_connected(self.current_input)
    }

    pub fn next_input_name(&self) -> Option<&str> {
        self.next_input().and_then(|id| self.input_by_num(id))
    }

    /// Start channel of the input [`next_input`](Self::next_input) returns.
    pub fn next_input_start_channel(&self) -> Option<&str> {
        self.next_input()
            .and_then(|id| self.inputs.get(id))
            .map(|r| r.start_channel.as_str())
    }

    fn commit_switch(&mut self, name: &str, set_starting: bool) -> Result<InputId, TuningError> {
        self.ensure_open()?;
        let id = self
            .inputs
            .lookup_by_name(name)
            .ok_or_else(|| TuningError::UnknownInput(name.to_string()))?;
        let record = self
            .inputs
            .get(id)
            .ok_or_else(|| TuningError::UnknownInput(name.to_string()))?;

        self.hardware.switch_input(record, set_starting).map_err(|e| {
            warn!("Switch to input '{}' failed: {}", name, e);
            e
        })?;

        info!("Card {} switched to input '{}'", self.config.card_id, name);
        self.current_input = Some(id);
        self.current_channel.clear();
        self.commercial_free = false;
        self.state = SessionState::Open;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use crate::session::{SessionConfig, SessionState, TuningSession};
    use crate::store::MemoryStore;
    use crate::testing::{two_input_store, MockHardware};
    use tunerbase_types::{ChannelChangeDirection, ChannelDescriptor, InputId, InputRecord, TuningError};

    fn open_session(hardware: MockHardware) -> TuningSession<MockHardware, MemoryStore> {
        let mut session = TuningSession::new(SessionConfig::default(), hardware, two_input_store());
        session.open().unwrap();
        session
    }

    #[test]
    fn test_switch_tunes_start_channel() {
        let mut session = open_session(MockHardware::default());
        session.switch_to_input("Cable").unwrap();

        assert_eq!(session.current_input_name(), Some("Cable"));
        assert_eq!(session.current_channel_name(), "100");
        assert_eq!(session.state(), SessionState::Tuned);
        assert_eq!(
            session.hardware().switches,
            vec![("Tuner".to_string(), false), ("Cable".to_string(), true)]
        );
        assert_eq!(
            session.get_next_channel_by_number("101", ChannelChangeDirection::Up),
            Ok(2100)
        );
    }

    #[test]
    fn test_next_input_wraps() {
        let mut session = open_session(MockHardware::default());
        session.switch_to_input("Cable").unwrap();
        assert_eq!(session.next_input(), Some(InputId(1)));
        assert_eq!(session.next_input_name(), Some("Tuner"));
        assert_eq!(session.next_input_start_channel(), Some("2"));
        assert_eq!(session.current_input_name(), Some("Cable"));
    }

    #[test]
    fn test_next_input_skips_disconnected() {
        let store = MemoryStore::with_inputs(vec![
            InputRecord::new(1, "Tuner", 1, 1),
            InputRecord::new(2, "Spare", 1, 0),
            InputRecord::new(3, "Cable", 1, 2),
        ]);
        let mut session = TuningSession::new(SessionConfig::default(), MockHardware::default(), store);
        session.initialize_inputs().unwrap();
        assert_eq!(session.next_input_name(), Some("Cable"));
    }

    #[test]
    fn test_unknown_input_leaves_state() {
        let mut session = open_session(MockHardware::default());
        session.set_channel_by_string("4").unwrap();

        assert_eq!(
            session.switch_to_input("Satellite"),
            Err(TuningError::UnknownInput("Satellite".to_string()))
        );
        assert_eq!(session.current_input_name(), Some("Tuner"));
        assert_eq!(session.current_channel_name(), "4");
        assert_eq!(session.hardware().switches, vec![("Tuner".to_string(), false)]);
    }

    #[test]
    fn test_failed_hardware_switch_leaves_state() {
        let mut session = open_session(MockHardware::failing_switch(&["Cable"]));
        session.set_channel_by_string("7").unwrap();

        assert!(matches!(
            session.switch_to_input("Cable"),
            Err(TuningError::HardwareUnavailable(_))
        ));
        assert_eq!(session.current_input_name(), Some("Tuner"));
        assert_eq!(session.current_channel_name(), "7");
        assert!(session.is_commercial_free());
    }

    #[test]
    fn test_failed_tune_keeps_input_switch() {
        let mut session = open_session(MockHardware::failing_tune(&["101"]));
        session.set_channel_by_string("2").unwrap();

        assert!(session.switch_to_input_with_channel("Cable", "101").is_err());
        assert_eq!(session.current_input_name(), Some("Cable"));
        assert_eq!(session.current_channel_name(), "");
        assert_eq!(session.state(), SessionState::Open);
        assert_eq!(
            session.hardware().switches,
            vec![("Tuner".to_string(), false), ("Cable".to_string(), false)]
        );

        session.set_channel_by_string("100").unwrap();
        assert_eq!(session.current_channel_name(), "100");
    }

    #[test]
    fn test_start_channel_missing_from_lineup() {
        let store = MemoryStore::with_inputs(vec![InputRecord::new(1, "Tuner", 1, 1)
            .with_start_channel("99")
            .with_channels(vec![ChannelDescriptor::new(1, "2")])]);
        let mut session = TuningSession::new(SessionConfig::default(), MockHardware::default(), store);
        session.open().unwrap();

        assert_eq!(
            session.switch_to_input("Tuner"),
            Err(TuningError::UnknownChannel("99".to_string()))
        );
        assert_eq!(session.current_input_name(), Some("Tuner"));
    }

    #[test]
    fn test_switch_requires_open() {
        let mut session = TuningSession::new(SessionConfig::default(), MockHardware::default(), two_input_store());
        session.initialize_inputs().unwrap();
        assert_eq!(session.switch_to_input("Cable"), Err(TuningError::NotOpen));
        assert_eq!(session.current_input_name(), Some("Tuner"));
    }
}
