//! delve: a turn-based dungeon crawl.
//!
//! A [`Session`] owns one generated dungeon together with the avatar, the
//! creatures hunting it and the keys it must collect. Front ends drive it
//! with [`Command`]s, read back [`Event`]s and draw the per-cell [`View`].

pub mod config;
pub mod error;
pub mod journal;
pub mod session;
pub mod snapshot;
pub mod view;

pub use config::SessionConfig;
pub use error::SessionError;
pub use journal::{Entry, EntryStyle, Journal};
pub use session::{Command, CreatureId, Event, Outcome, Session};
pub use snapshot::Snapshot;
pub use view::{Cell, Occupant, View};
