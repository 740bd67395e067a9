//! Dungeon Incremental: combat and progression engine for a browser
//! incremental RPG.
//!
//! The crate is pure game logic: no rendering, no input handling. A UI drives
//! it through [`dungeon::DungeonGame`] and renders the [`log::LogLine`]s and
//! state it exposes.

pub mod dungeon;
pub mod error;
pub mod log;

pub use dungeon::{Command, DungeonGame};
pub use error::{ActionError, CatalogError, SaveError};
