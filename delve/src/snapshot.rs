//! Serializable session snapshots.
//!
//! A [`Snapshot`] carries the complete state of a [`Session`], random
//! generator included, so a restored session continues exactly as the
//! original would have. Storage is left to the caller: the snapshot only
//! implements serde's traits.

use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::session::Session;

/// Bumped whenever the snapshot layout changes.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Opaque saved state of a [`Session`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    version: u32,
    session: Session,
}

impl Session {
    /// Capture the full session state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            session: self.clone(),
        }
    }

    /// Rebuild a session from a snapshot, checking that its parts agree.
    pub fn restore(snapshot: Snapshot) -> Result<Self, SessionError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(corrupt(format!(
                "version {} (expected {SNAPSHOT_VERSION})",
                snapshot.version
            )));
        }
        let s = snapshot.session;
        if !s.grid.is_well_formed() {
            return Err(corrupt("map cells do not match its size".into()));
        }
        if !s.fog.is_well_formed() {
            return Err(corrupt("fog cells do not match its size".into()));
        }
        let bounds = s.grid.bounds();
        if (bounds.width(), bounds.height()) != (s.config.width, s.config.height) {
            return Err(corrupt(format!(
                "map is {}x{}, config says {}x{}",
                bounds.width(),
                bounds.height(),
                s.config.width,
                s.config.height
            )));
        }
        if s.fog.bounds() != bounds {
            return Err(corrupt("fog does not match the map".into()));
        }
        if !s.grid.get(s.avatar).is_some_and(|t| t.traversable()) {
            return Err(corrupt(format!("avatar at {} is not on open ground", s.avatar)));
        }
        if let Some(c) = s.creatures.iter().find(|c| !bounds.contains(c.pos)) {
            return Err(corrupt(format!("creature at {} is off the map", c.pos)));
        }
        let mut seen = vec![false; s.creatures.len()];
        for id in &s.order {
            match seen.get_mut(id.0) {
                Some(slot) if !*slot => *slot = true,
                _ => return Err(corrupt(format!("bad creature order entry {}", id.0))),
            }
        }
        if seen.contains(&false) {
            return Err(corrupt("creature order is incomplete".into()));
        }
        if s.keys_found > s.config.key_count || s.health > s.config.max_health {
            return Err(corrupt("counters out of range".into()));
        }
        Ok(s)
    }
}

fn corrupt(msg: String) -> SessionError {
    SessionError::CorruptSnapshot(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Command, CreatureId};
    use crate::SessionConfig;
    use delve_core::Point;

    fn play(s: &mut Session, keys: &str) {
        for c in keys.chars().filter_map(Command::from_key) {
            s.apply(c);
        }
    }

    #[test]
    fn restored_session_continues_identically() {
        let mut original = Session::new(SessionConfig::with_seed(21)).unwrap();
        play(&mut original, "ddddwwww  aa");

        let json = serde_json::to_string(&original.snapshot()).unwrap();
        let snap: Snapshot = serde_json::from_str(&json).unwrap();
        let mut restored = Session::restore(snap).unwrap();
        assert_eq!(restored, original);

        let rest = "ssss dddd 0 wwww aaaa";
        play(&mut original, rest);
        play(&mut restored, rest);
        assert_eq!(restored.snapshot(), original.snapshot());
    }

    #[test]
    fn wrong_version_is_rejected() {
        let s = Session::new(SessionConfig::with_seed(2)).unwrap();
        let mut snap = s.snapshot();
        snap.version += 1;
        assert!(matches!(
            Session::restore(snap),
            Err(SessionError::CorruptSnapshot(_))
        ));
    }

    #[test]
    fn inconsistent_state_is_rejected() {
        let s = Session::new(SessionConfig::with_seed(2)).unwrap();

        let mut snap = s.snapshot();
        snap.session.avatar = Point::new(-1, 0);
        assert!(Session::restore(snap).is_err());

        let mut snap = s.snapshot();
        snap.session.order.push(CreatureId(0));
        assert!(Session::restore(snap).is_err());

        let mut snap = s.snapshot();
        snap.session.order.pop();
        assert!(Session::restore(snap).is_err());

        let mut snap = s.snapshot();
        snap.session.config.width += 1;
        assert!(Session::restore(snap).is_err());

        assert!(Session::restore(s.snapshot()).is_ok());
    }

    #[test]
    fn truncated_grids_are_rejected() {
        let s = Session::new(SessionConfig::with_seed(2)).unwrap();
        let grids: [&[&str]; 3] = [&["grid"], &["fog", "memory"], &["fog", "visible"]];
        for path in grids {
            let mut json = serde_json::to_value(s.snapshot()).unwrap();
            let mut node = &mut json["session"];
            for key in path {
                node = &mut node[*key];
            }
            node["cells"].as_array_mut().unwrap().truncate(1);
            let snap: Snapshot = serde_json::from_value(json).unwrap();
            assert!(
                matches!(Session::restore(snap), Err(SessionError::CorruptSnapshot(_))),
                "{path:?}"
            );
        }
    }
}
