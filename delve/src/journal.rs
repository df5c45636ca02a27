//! Message journal shown alongside the map.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Oldest entries are dropped in chunks once the journal grows past this.
const MAX_ENTRIES: usize = 2000;

/// Kind of journal entry, for front ends that colour messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryStyle {
    Normal,
    /// A refused command.
    Refused,
    Hurt,
    Key,
    /// End of the game.
    Ending,
}

/// A single journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub text: String,
    pub style: EntryStyle,
    /// First entry of its turn.
    pub turn_start: bool,
    /// Times the same message was repeated right after itself.
    pub dups: u32,
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.turn_start {
            f.write_str("* ")?;
        }
        f.write_str(&self.text)?;
        if self.dups > 0 {
            write!(f, " ({}x)", self.dups + 1)?;
        }
        Ok(())
    }
}

/// The session's message journal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    entries: Vec<Entry>,
    next_turn: bool,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the start of a new turn: the next entry gets a turn marker.
    pub fn new_turn(&mut self) {
        self.next_turn = true;
    }

    /// Add a message with a given style.
    pub fn log_styled(&mut self, text: &str, style: EntryStyle) {
        let text = uppercase_first(text);

        if let Some(last) = self.entries.last_mut() {
            if last.text == text && last.style == style && !self.next_turn {
                last.dups += 1;
                return;
            }
        }

        self.entries.push(Entry {
            text,
            style,
            turn_start: self.next_turn,
            dups: 0,
        });
        self.next_turn = false;

        if self.entries.len() > MAX_ENTRIES {
            self.entries.drain(0..MAX_ENTRIES / 10);
        }
    }

    pub fn log(&mut self, text: &str) {
        self.log_styled(text, EntryStyle::Normal);
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// The last `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> &[Entry] {
        &self.entries[self.entries.len().saturating_sub(n)..]
    }
}

fn uppercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().to_string() + chars.as_str(),
    }
}
