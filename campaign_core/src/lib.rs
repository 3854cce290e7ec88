//! # Campaign Core
//!
//! The engine of the campaign journal. This crate builds the relationship
//! graph over `campaign_model` events, runs live recording sessions that
//! stream synthetic events, and pushes every change to subscribers.
//!
//! ## Core Components
//!
//! - **graph**: Pure graph builder plus neighborhood and details queries
//! - **live**: Session runtime, scheduler abstraction and event generator
//! - **broadcast**: Listener registry with isolated delivery
//! - **view**: Selection/highlight state machine over a render surface
//! - **storage**: Key-value persistence and the session directory
//! - **timeline**: Event queries, timeline merging and recall
//! - **editor**: Persisted edits to characters, locations and quests
//!
//! ## Design Philosophy
//!
//! - **Rebuild, don't patch**: The graph is always rebuilt from the full event list
//! - **Explicit ownership**: All live state sits in one runtime value, never in globals
//! - **Degrade quietly**: Corrupt storage reads as empty and failing listeners are skipped

pub mod broadcast;
pub mod config;
pub mod editor;
pub mod error;
pub mod graph;
pub mod live;
pub mod storage;
pub mod timeline;
pub mod view;

pub use broadcast::*;
pub use config::*;
pub use editor::*;
pub use error::*;
pub use graph::*;
pub use live::*;
pub use storage::*;
pub use timeline::*;
pub use view::*;
