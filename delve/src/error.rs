//! Session errors.

use std::fmt;

use delve_rl::GenError;

/// Errors raised when starting or restoring a session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// The dungeon could not be generated.
    Gen(GenError),
    /// No free floor cell was found for a spawn.
    NoSpawnPoint { what: &'static str },
    /// A snapshot failed validation.
    CorruptSnapshot(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gen(e) => write!(f, "dungeon generation failed: {e}"),
            Self::NoSpawnPoint { what } => write!(f, "no free floor cell to place {what}"),
            Self::CorruptSnapshot(msg) => write!(f, "corrupt snapshot: {msg}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gen(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GenError> for SessionError {
    fn from(e: GenError) -> Self {
        Self::Gen(e)
    }
}
