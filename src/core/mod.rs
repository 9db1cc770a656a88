//! Core types for the QSYNC protocol: constants, configuration, the error
//! taxonomy, and the media item value type.

pub mod config;
pub mod constants;
pub mod error;
pub mod media;

pub use config::QueueConfig;
pub use constants::*;
pub use error::RejectReason;
pub use media::MediaItem;
