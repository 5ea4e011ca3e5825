//! Shared types for the tunerbase tuning layer.
//!
//! This crate defines the value types that travel between the tuning
//! session, its persistence gateway and front-ends:
//!
//! - [`InputRecord`]: one physical input of a capture card and its channels
//! - [`ChannelDescriptor`]: one tunable channel
//! - [`ChannelChangeDirection`]: relative channel navigation
//! - [`TuningError`]: failures reported by session operations
//!
//! ```rust
//! use tunerbase_types::{ChannelDescriptor, InputRecord};
//!
//! let input = InputRecord::new(1, "Tuner", 1, 1)
//!     .with_start_channel("2")
//!     .with_channels(vec![
//!         ChannelDescriptor::new(1002, "2"),
//!         ChannelDescriptor::new(1004, "4").favorite(true),
//!     ]);
//!
//! assert!(input.is_connected());
//! assert_eq!(input.channel("4").map(|c| c.chan_id), Some(1004));
//! ```

pub mod error;
pub mod types;

pub use error::{ChangerError, TuningError};
pub use types::{
    ChangerRef, ChannelChangeDirection, ChannelDescriptor, HardwareHints, InputId, InputRecord,
    PictureAdjustType, PictureAttribute,
};
