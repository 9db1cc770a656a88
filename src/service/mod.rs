//! QSYNC Protocol - Service Layer
//!
//! A single-writer actor over a [`crate::sync::QueueAuthority`]: commands
//! arrive on an mpsc channel and are executed one at a time against the
//! owned authority, which serializes all mutation without a lock. Every
//! applied delta is republished on a broadcast channel so the transport
//! collaborator can fan it out to observers.

mod actor;

pub use actor::*;
