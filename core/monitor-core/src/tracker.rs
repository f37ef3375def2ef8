//! Session tracking: screen name -> last observed online seconds.
//!
//! A shrinking `online_seconds` for a name that never left the listing means
//! the server restarted that user's session, which counts as a re-sign-on.

use std::collections::{HashMap, HashSet};

use signon_presence_protocol::SessionEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    SignedOn,
    ReSignedOn,
    StillOnline,
}

#[derive(Debug, Default)]
pub struct SessionTracker {
    sessions: HashMap<String, u64>,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the table from a startup snapshot without classifying anything.
    ///
    /// Returns the number of entries seeded.
    pub fn seed_baseline(&mut self, entries: &[SessionEntry]) -> usize {
        let mut seeded = 0;
        for entry in entries {
            let (Some(name), Some(online_seconds)) = (entry.identity(), entry.online_seconds)
            else {
                continue;
            };
            self.sessions.insert(name.to_string(), online_seconds);
            seeded += 1;
        }
        seeded
    }

    /// Classifies one observation and stores it as the latest value.
    pub fn classify(&mut self, screen_name: &str, online_seconds: u64) -> Transition {
        let transition = match self.sessions.get(screen_name) {
            None => Transition::SignedOn,
            Some(&stored) if online_seconds < stored => Transition::ReSignedOn,
            Some(_) => Transition::StillOnline,
        };
        self.sessions.insert(screen_name.to_string(), online_seconds);
        transition
    }

    /// Classifies a raw entry, returning its name with the transition.
    /// Entries without a name or a duration are skipped and leave the table
    /// untouched.
    pub fn observe<'a>(&mut self, entry: &'a SessionEntry) -> Option<(&'a str, Transition)> {
        let name = entry.identity()?;
        let online_seconds = entry.online_seconds?;
        Some((name, self.classify(name, online_seconds)))
    }

    /// Drops every tracked name missing from `online`. Returns the removed
    /// names, sorted.
    pub fn purge(&mut self, online: &HashSet<&str>) -> Vec<String> {
        let mut signed_off: Vec<String> = self
            .sessions
            .keys()
            .filter(|name| !online.contains(name.as_str()))
            .cloned()
            .collect();
        signed_off.sort();
        for name in &signed_off {
            self.sessions.remove(name);
        }
        signed_off
    }

    pub fn online_seconds(&self, screen_name: &str) -> Option<u64> {
        self.sessions.get(screen_name).copied()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
