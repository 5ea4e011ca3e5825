//! Hardware hooks implemented by each tuner family.
//!
//! A [`TuningSession`](crate::session::TuningSession) drives one value
//! implementing [`ChannelHardware`]. Hooks are synchronous and may block on
//! device I/O; they run on the thread that owns the session.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tunerbase_types::{InputRecord, PictureAdjustType, PictureAttribute, TuningError};

pub use self::dummy::DummyHardware;
pub use self::unsupported::UnsupportedHardware;

mod dummy;
mod unsupported;

/// Raw device descriptor as exposed by drivers.
pub type DeviceFd = i32;

/// Capability set of a tuning device.
pub trait ChannelHardware {
    /// Open the channel changing hardware for use.
    fn open(&mut self) -> Result<(), TuningError>;

    /// Release the hardware.
    fn close(&mut self);

    fn is_open(&self) -> bool;

    /// Tune `channum` on `input`, which is the active input.
    fn set_channel(&mut self, input: &InputRecord, channum: &str) -> Result<(), TuningError>;

    /// Make `input` the active hardware input.
    ///
    /// `set_starting` is true when the session will tune the input's start
    /// channel right after a successful switch.
    fn switch_input(&mut self, input: &InputRecord, set_starting: bool) -> Result<(), TuningError>;

    fn set_fd(&mut self, _fd: DeviceFd) {}

    /// Device descriptor, if the family has one.
    fn fd(&self) -> Option<DeviceFd> {
        None
    }

    /// Device string for debugging.
    fn device(&self) -> String {
        String::new()
    }

    /// Re-issue the last tune to the hardware.
    fn retune(&mut self) -> Result<(), TuningError> {
        Err(TuningError::Unsupported("retune"))
    }

    fn init_picture_attributes(&mut self) -> bool {
        false
    }

    /// Current value of a picture attribute, `None` if unsupported.
    fn picture_attribute(&self, _attr: PictureAttribute) -> Option<i32> {
        None
    }

    /// Step a picture attribute up or down, returning the new value.
    fn change_picture_attribute(
        &mut self,
        _adjust: PictureAdjustType,
        _attr: PictureAttribute,
        _up: bool,
    ) -> Option<i32> {
        None
    }
}

impl<H: ChannelHardware + ?Sized> ChannelHardware for Box<H> {
    fn open(&mut self) -> Result<(), TuningError> {
        (**self).open()
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn set_channel(&mut self, input: &InputRecord, channum: &str) -> Result<(), TuningError> {
        (**self).set_channel(input, channum)
    }

    fn switch_input(&mut self, input: &InputRecord, set_starting: bool) -> Result<(), TuningError> {
        (**self).switch_input(input, set_starting)
    }

    fn set_fd(&mut self, fd: DeviceFd) {
        (**self).set_fd(fd)
    }

    fn fd(&self) -> Option<DeviceFd> {
        (**self).fd()
    }

    fn device(&self) -> String {
        (**self).device()
    }

    fn retune(&mut self) -> Result<(), TuningError> {
        (**self).retune()
    }

    fn init_picture_attributes(&mut self) -> bool {
        (**self).init_picture_attributes()
    }

    fn picture_attribute(&self, attr: PictureAttribute) -> Option<i32> {
        (**self).picture_attribute(attr)
    }

    fn change_picture_attribute(
        &mut self,
        adjust: PictureAdjustType,
        attr: PictureAttribute,
        up: bool,
    ) -> Option<i32> {
        (**self).change_picture_attribute(adjust, attr, up)
    }
}

/// Tuner hardware families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HardwareFamily {
    /// Software-only card with no device behind it.
    #[default]
    Dummy,
    /// Analog capture card.
    Analog,
    Atsc,
    Dvb,
    /// Composite/S-Video input controlled by an external changer.
    Composite,
}

impl HardwareFamily {
    pub fn name(&self) -> &'static str {
        match self {
            HardwareFamily::Dummy => "dummy",
            HardwareFamily::Analog => "analog",
            HardwareFamily::Atsc => "atsc",
            HardwareFamily::Dvb => "dvb",
            HardwareFamily::Composite => "composite",
        }
    }
}

impl fmt::Display for HardwareFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HardwareFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dummy" => Ok(HardwareFamily::Dummy),
            "analog" | "v4l" => Ok(HardwareFamily::Analog),
            "atsc" => Ok(HardwareFamily::Atsc),
            "dvb" => Ok(HardwareFamily::Dvb),
            "composite" => Ok(HardwareFamily::Composite),
            other => Err(format!("unknown hardware family: {}", other)),
        }
    }
}

/// Build the hardware implementation for `family`.
///
/// Families whose drivers are not part of this build yield an
/// [`UnsupportedHardware`] that refuses to open.
pub fn open_hardware(family: HardwareFamily, device: &str) -> Box<dyn ChannelHardware + Send> {
    match family {
        HardwareFamily::Dummy | HardwareFamily::Composite => Box::new(DummyHardware::new(device)),
        other => Box::new(UnsupportedHardware::new(other, device)),
    }
}
