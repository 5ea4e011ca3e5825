use tunerbase_types::{InputRecord, TuningError};

use crate::hardware::{ChannelHardware, HardwareFamily};

const UNSUPPORTED_MSG: &str = "Driver for this tuner family is not built into tunerbase";

/// Stand-in for a family whose driver is not part of this build.
#[derive(Debug, Clone)]
pub struct UnsupportedHardware {
    family: HardwareFamily,
    device: String,
}

impl UnsupportedHardware {
    pub fn new(family: HardwareFamily, device: impl Into<String>) -> Self {
        Self {
            family,
            device: device.into(),
        }
    }

    pub fn family(&self) -> HardwareFamily {
        self.family
    }
}

impl ChannelHardware for UnsupportedHardware {
    fn open(&mut self) -> Result<(), TuningError> {
        log::error!("Cannot open {} device {}: {}", self.family, self.device, UNSUPPORTED_MSG);
        Err(TuningError::Unsupported(UNSUPPORTED_MSG))
    }

    fn close(&mut self) {}

    fn is_open(&self) -> bool {
        false
    }

    fn set_channel(&mut self, _input: &InputRecord, _channum: &str) -> Result<(), TuningError> {
        Err(TuningError::Unsupported(UNSUPPORTED_MSG))
    }

    fn switch_input(&mut self, _input: &InputRecord, _set_starting: bool) -> Result<(), TuningError> {
        Err(TuningError::Unsupported(UNSUPPORTED_MSG))
    }

    fn device(&self) -> String {
        format!("{}:{}", self.family, self.device)
    }
}
