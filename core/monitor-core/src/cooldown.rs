//! Per-user message cooldown.
//!
//! Entries outlive sign-off: a user who drops and reconnects inside the window
//! is still suppressed even though the session tracker already forgot them.

use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    CoolingDown { remaining: Duration },
}

#[derive(Debug, Default)]
pub struct CooldownGuard {
    last_messaged: HashMap<String, DateTime<Utc>>,
}

impl CooldownGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&self, screen_name: &str, window: Duration, now: DateTime<Utc>) -> Eligibility {
        let Some(recorded) = self.last_messaged.get(screen_name) else {
            return Eligibility::Eligible;
        };
        let elapsed = now.signed_duration_since(*recorded);
        if elapsed >= window {
            Eligibility::Eligible
        } else {
            Eligibility::CoolingDown {
                remaining: window - elapsed,
            }
        }
    }

    pub fn record(&mut self, screen_name: &str, now: DateTime<Utc>) {
        self.last_messaged.insert(screen_name.to_string(), now);
    }

    /// Forgets offline users whose last message is older than the window.
    /// Returns the removed names, sorted.
    pub fn expire(
        &mut self,
        online: &HashSet<&str>,
        window: Duration,
        now: DateTime<Utc>,
    ) -> Vec<String> {
        let mut expired: Vec<String> = self
            .last_messaged
            .iter()
            .filter(|(name, recorded)| {
                !online.contains(name.as_str()) && now.signed_duration_since(**recorded) > window
            })
            .map(|(name, _)| name.clone())
            .collect();
        expired.sort();
        for name in &expired {
            self.last_messaged.remove(name);
        }
        expired
    }

    pub fn last_messaged(&self, screen_name: &str) -> Option<DateTime<Utc>> {
        self.last_messaged.get(screen_name).copied()
    }

    pub fn len(&self) -> usize {
        self.last_messaged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_messaged.is_empty()
    }
}

/// Renders a remaining wait as `4m 59s`.
pub fn format_remaining(remaining: Duration) -> String {
    let total = remaining.num_seconds().max(0);
    format!("{}m {}s", total / 60, total % 60)
}
