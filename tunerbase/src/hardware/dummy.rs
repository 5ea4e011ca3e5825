use std::collections::HashMap;

use log::{debug, info};
use tunerbase_types::{InputId, InputRecord, PictureAdjustType, PictureAttribute, TuningError};

use crate::hardware::{ChannelHardware, DeviceFd};

const PICTURE_DEFAULT: i32 = 50;
const PICTURE_STEP: i32 = 1;
const PICTURE_MAX: i32 = 100;

/// Software-only card: accepts every switch and tune while open and keeps
/// track of what it was asked to do.
#[derive(Debug, Clone, Default)]
pub struct DummyHardware {
    device: String,
    open: bool,
    fd: Option<DeviceFd>,
    active_input: Option<InputId>,
    tuned: Option<String>,
    picture: HashMap<PictureAttribute, i32>,
}

impl DummyHardware {
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            ..Default::default()
        }
    }

    /// Input the hardware is switched to.
    pub fn active_input(&self) -> Option<InputId> {
        self.active_input
    }

    /// Channel the hardware is tuned to.
    pub fn tuned_channel(&self) -> Option<&str> {
        self.tuned.as_deref()
    }

    fn ensure_open(&self) -> Result<(), TuningError> {
        if self.open {
            Ok(())
        } else {
            Err(TuningError::HardwareUnavailable(format!(
                "{} is not open",
                self.device
            )))
        }
    }
}

impl ChannelHardware for DummyHardware {
    fn open(&mut self) -> Result<(), TuningError> {
        if !self.open {
            info!("[dummy] Opened {}", self.device);
        }
        self.open = true;
        Ok(())
    }

    fn close(&mut self) {
        if self.open {
            info!("[dummy] Closed {}", self.device);
        }
        self.open = false;
        self.fd = None;
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn set_channel(&mut self, input: &InputRecord, channum: &str) -> Result<(), TuningError> {
        self.ensure_open()?;
        if self.active_input != Some(input.id) {
            return Err(TuningError::HardwareUnavailable(format!(
                "input {} is not active on {}",
                input.name, self.device
            )));
        }
        debug!("[dummy] {} tuned to {} on {}", self.device, channum, input.name);
        self.tuned = Some(channum.to_string());
        Ok(())
    }

    fn switch_input(&mut self, input: &InputRecord, _set_starting: bool) -> Result<(), TuningError> {
        self.ensure_open()?;
        debug!("[dummy] {} switched to input {}", self.device, input.name);
        self.active_input = Some(input.id);
        self.tuned = None;
        Ok(())
    }

    fn set_fd(&mut self, fd: DeviceFd) {
        self.fd = Some(fd);
    }

    fn fd(&self) -> Option<DeviceFd> {
        self.fd
    }

    fn device(&self) -> String {
        self.device.clone()
    }

    fn retune(&mut self) -> Result<(), TuningError> {
        self.ensure_open()?;
        match &self.tuned {
            Some(channum) => {
                debug!("[dummy] {} retuned to {}", self.device, channum);
                Ok(())
            }
            None => Err(TuningError::HardwareUnavailable(format!(
                "{} has nothing to retune",
                self.device
            ))),
        }
    }

    fn init_picture_attributes(&mut self) -> bool {
        for attr in [
            PictureAttribute::Brightness,
            PictureAttribute::Contrast,
            PictureAttribute::Colour,
            PictureAttribute::Hue,
        ] {
            self.picture.entry(attr).or_insert(PICTURE_DEFAULT);
        }
        true
    }

    fn picture_attribute(&self, attr: PictureAttribute) -> Option<i32> {
        self.picture.get(&attr).copied()
    }

    fn change_picture_attribute(
        &mut self,
        _adjust: PictureAdjustType,
        attr: PictureAttribute,
        up: bool,
    ) -> Option<i32> {
        let value = self.picture.get_mut(&attr)?;
        let delta = if up { PICTURE_STEP } else { -PICTURE_STEP };
        *value = (*value + delta).clamp(0, PICTURE_MAX);
        Some(*value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_open() {
        let mut hw = DummyHardware::new("dummy0");
        let input = InputRecord::new(1, "Tuner", 1, 1);
        assert!(hw.switch_input(&input, true).is_err());

        hw.open().unwrap();
        hw.switch_input(&input, true).unwrap();
        hw.set_channel(&input, "4").unwrap();
        assert_eq!(hw.tuned_channel(), Some("4"));
        assert!(hw.retune().is_ok());

        hw.close();
        assert!(!hw.is_open());
        assert!(hw.set_channel(&input, "5").is_err());
    }

    #[test]
    fn test_tune_requires_active_input() {
        let mut hw = DummyHardware::new("dummy0");
        hw.open().unwrap();
        let tuner = InputRecord::new(1, "Tuner", 1, 1);
        let cable = InputRecord::new(2, "Cable", 1, 2);

        hw.switch_input(&tuner, false).unwrap();
        assert!(hw.set_channel(&cable, "100").is_err());
        assert_eq!(hw.active_input(), Some(InputId(1)));
    }

    #[test]
    fn test_picture_attributes_clamp() {
        let mut hw = DummyHardware::new("dummy0");
        assert_eq!(hw.picture_attribute(PictureAttribute::Hue), None);
        assert!(hw.init_picture_attributes());

        assert_eq!(
            hw.change_picture_attribute(PictureAdjustType::Channel, PictureAttribute::Hue, true),
            Some(51)
        );
        for _ in 0..200 {
            hw.change_picture_attribute(PictureAdjustType::Channel, PictureAttribute::Hue, false);
        }
        assert_eq!(hw.picture_attribute(PictureAttribute::Hue), Some(0));
        assert_eq!(
            hw.change_picture_attribute(PictureAdjustType::Playback, PictureAttribute::Volume, true),
            None
        );
    }
}
