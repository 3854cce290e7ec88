//! # Campaign Model
//!
//! The data model of the campaign journal - characters, locations, quests,
//! the timestamped events that reference them, and the sessions during which
//! events are recorded. This crate holds no I/O and no engine logic.

pub mod entities;
pub mod error;
pub mod events;
pub mod registry;
pub mod sessions;

pub use entities::*;
pub use error::*;
pub use events::*;
pub use registry::*;
pub use sessions::*;

/// Milliseconds since the Unix epoch.
pub type Timestamp = i64;
