//! Scripted hardware, transports and fixtures shared by unit tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tunerbase_types::{ChangerError, ChangerRef, ChannelDescriptor, InputRecord, TuningError};

use crate::changer::ChangerTransport;
use crate::hardware::ChannelHardware;
use crate::input::InputRegistry;
use crate::store::{InputStore, MemoryStore};

/// Hardware whose hooks succeed unless told otherwise, recording every call.
#[derive(Debug, Default)]
pub(crate) struct MockHardware {
    pub open: bool,
    pub fail_open: bool,
    /// Input names whose switch hook fails.
    pub fail_switch: HashSet<String>,
    /// Channel numbers whose tune hook fails.
    pub fail_tune: HashSet<String>,
    pub switches: Vec<(String, bool)>,
    pub tunes: Vec<(String, String)>,
    /// Set by `close`; shared so it can be checked after the session is gone.
    pub closed: Arc<AtomicBool>,
}

impl MockHardware {
    pub fn failing_tune(channums: &[&str]) -> Self {
        Self {
            fail_tune: channums.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn failing_switch(inputs: &[&str]) -> Self {
        Self {
            fail_switch: inputs.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }
}

impl ChannelHardware for MockHardware {
    fn open(&mut self) -> Result<(), TuningError> {
        if self.fail_open {
            return Err(TuningError::HardwareUnavailable("mock open failed".to_string()));
        }
        self.open = true;
        Ok(())
    }

    fn close(&mut self) {
        self.open = false;
        self.closed.store(true, Ordering::SeqCst);
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn set_channel(&mut self, input: &InputRecord, channum: &str) -> Result<(), TuningError> {
        if self.fail_tune.contains(channum) {
            return Err(TuningError::HardwareUnavailable(format!("mock tune {} failed", channum)));
        }
        self.tunes.push((input.name.clone(), channum.to_string()));
        Ok(())
    }

    fn switch_input(&mut self, input: &InputRecord, set_starting: bool) -> Result<(), TuningError> {
        if self.fail_switch.contains(&input.name) {
            return Err(TuningError::HardwareUnavailable(format!(
                "mock switch to {} failed",
                input.name
            )));
        }
        self.switches.push((input.name.clone(), set_starting));
        Ok(())
    }
}

/// Changer transport that fails a fixed number of times, then succeeds.
#[derive(Debug, Clone, Default)]
pub(crate) struct FlakyTransport {
    pub failures_left: Arc<Mutex<u32>>,
    pub sent: Arc<Mutex<Vec<String>>>,
}

impl FlakyTransport {
    pub fn failing(times: u32) -> Self {
        Self {
            failures_left: Arc::new(Mutex::new(times)),
            sent: Arc::default(),
        }
    }
}

impl ChangerTransport for FlakyTransport {
    fn send(&mut self, changer: &ChangerRef, channum: &str) -> Result<(), ChangerError> {
        self.sent.lock().unwrap().push(channum.to_string());
        let mut left = self.failures_left.lock().unwrap();
        if *left > 0 {
            *left -= 1;
            return Err(ChangerError::Busy(changer.to_string()));
        }
        Ok(())
    }
}

/// Store whose reads always fail.
#[derive(Debug, Default)]
pub(crate) struct BrokenStore;

#[derive(Debug, thiserror::Error)]
#[error("store offline")]
pub(crate) struct BrokenStoreError;

impl InputStore for BrokenStore {
    type Error = BrokenStoreError;

    fn load_inputs(&mut self, _card_id: u32) -> Result<Vec<InputRecord>, Self::Error> {
        Err(BrokenStoreError)
    }

    fn load_default_input(&mut self, _card_id: u32) -> Result<Option<String>, Self::Error> {
        Err(BrokenStoreError)
    }

    fn store_input_channels(&mut self, _inputs: &InputRegistry) -> Result<(), Self::Error> {
        Err(BrokenStoreError)
    }

    fn store_default_input(&mut self, _card_id: u32, _input_name: &str) -> Result<(), Self::Error> {
        Err(BrokenStoreError)
    }
}

/// Card 1 with a "Tuner" input (2, 4, 7) and a "Cable" input (100, 101).
pub(crate) fn two_input_store() -> MemoryStore {
    MemoryStore::with_inputs(vec![
        InputRecord::new(1, "Tuner", 1, 1)
            .with_start_channel("2")
            .with_channels(vec![
                ChannelDescriptor::new(1002, "2").favorite(true),
                ChannelDescriptor::new(1004, "4"),
                ChannelDescriptor::new(1007, "7").favorite(true).commercial_free(true),
            ]),
        InputRecord::new(2, "Cable", 1, 2)
            .with_start_channel("100")
            .with_channels(vec![
                ChannelDescriptor::new(2100, "100"),
                ChannelDescriptor::new(2101, "101"),
            ]),
    ])
}
