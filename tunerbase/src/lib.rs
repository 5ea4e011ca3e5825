//! tunerbase library - tuning-hardware abstraction for capture cards
//!
//! This library provides a uniform tuning contract over heterogeneous tuner
//! hardware: a [`TuningSession`] per card owns the card's inputs, navigates
//! channel lineups, switches inputs and drives external channel changers,
//! delegating device work to a [`ChannelHardware`] implementation.
//!
//! ```rust
//! use tunerbase::{DummyHardware, MemoryStore, SessionConfig, TuningSession};
//! use tunerbase::types::{ChannelDescriptor, InputRecord};
//!
//! let store = MemoryStore::with_inputs(vec![InputRecord::new(1, "Tuner", 1, 1)
//!     .with_start_channel("2")
//!     .with_channels(vec![
//!         ChannelDescriptor::new(1002, "2"),
//!         ChannelDescriptor::new(1004, "4"),
//!     ])]);
//!
//! let mut session = TuningSession::new(SessionConfig::default(), DummyHardware::new("dummy0"), store);
//! session.open().unwrap();
//! session.switch_to_input("Tuner").unwrap();
//! assert_eq!(session.current_channel_name(), "2");
//! ```

pub mod changer;
#[cfg(feature = "database")]
pub mod database;
pub mod hardware;
pub mod input;
pub mod navigator;
pub mod session;
pub mod store;
mod switcher;

#[cfg(test)]
mod testing;

pub use tunerbase_types as types;

// Re-export commonly used types
pub use changer::{ChangerTransport, CommandTransport, ExternalChangerBridge};
#[cfg(feature = "database")]
pub use database::{Database, DatabaseError};
pub use hardware::{open_hardware, ChannelHardware, DummyHardware, HardwareFamily};
pub use input::InputRegistry;
pub use navigator::ChannelNavigator;
pub use session::{SessionConfig, SessionState, TuningSession};
pub use store::{InputStore, MemoryStore};
pub use tunerbase_types::{ChannelChangeDirection, TuningError};
