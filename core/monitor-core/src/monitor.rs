//! The poll loop.
//!
//! Each cycle fetches the session listing, forgets users who left, expires old
//! cooldowns, then walks the listing in order and messages every fresh sign-on.
//! Dispatch is synchronous, so one user's pre-dispatch delay holds up the rest
//! of the cycle.

use signon_presence_protocol::{SessionEntry, SessionsResponse};
use std::collections::HashSet;
use std::time::Duration as StdDuration;
use tracing::{debug, info, warn};

use crate::adapters::{Clock, Notifier, PresenceSource, SystemClock};
use crate::config::MonitorConfig;
use crate::cooldown::CooldownGuard;
use crate::dispatch::{dispatch, DispatchOutcome, DispatchPolicy};
use crate::shutdown::ShutdownSignal;
use crate::tracker::{SessionTracker, Transition};

/// Tallies for one poll cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub fetch_failed: bool,
    pub online: usize,
    pub signed_on: usize,
    pub re_signed_on: usize,
    pub still_online: usize,
    pub signed_off: usize,
    pub cooldowns_expired: usize,
    pub malformed: usize,
    pub sent: usize,
    pub suppressed: usize,
    pub ignored: usize,
    pub legacy: usize,
    pub failed: usize,
}

impl CycleReport {
    fn tally(&mut self, outcome: &DispatchOutcome) {
        match outcome {
            DispatchOutcome::Sent => self.sent += 1,
            DispatchOutcome::Ignored => self.ignored += 1,
            DispatchOutcome::LegacyTransport => self.legacy += 1,
            DispatchOutcome::CoolingDown { .. } => self.suppressed += 1,
            DispatchOutcome::Failed(_) => self.failed += 1,
        }
    }
}

pub struct Monitor<S, N, C = SystemClock> {
    source: S,
    notifier: N,
    clock: C,
    policy: DispatchPolicy,
    poll_interval: StdDuration,
    baseline_on_startup: bool,
    sessions: SessionTracker,
    cooldown: CooldownGuard,
}

impl<S: PresenceSource, N: Notifier> Monitor<S, N, SystemClock> {
    pub fn new(config: &MonitorConfig, source: S, notifier: N) -> Self {
        Self::with_clock(config, source, notifier, SystemClock)
    }
}

impl<S: PresenceSource, N: Notifier, C: Clock> Monitor<S, N, C> {
    pub fn with_clock(config: &MonitorConfig, source: S, notifier: N, clock: C) -> Self {
        Self {
            source,
            notifier,
            clock,
            policy: DispatchPolicy::from_config(config),
            poll_interval: config.poll_interval(),
            baseline_on_startup: config.monitoring.baseline_on_startup,
            sessions: SessionTracker::new(),
            cooldown: CooldownGuard::new(),
        }
    }

    pub fn sessions(&self) -> &SessionTracker {
        &self.sessions
    }

    pub fn cooldown(&self) -> &CooldownGuard {
        &self.cooldown
    }

    pub fn sessions_mut(&mut self) -> &mut SessionTracker {
        &mut self.sessions
    }

    pub fn cooldown_mut(&mut self) -> &mut CooldownGuard {
        &mut self.cooldown
    }

    /// Seeds the session table from one fetch so users already online are
    /// not greeted. A failed fetch leaves the table empty.
    pub fn establish_baseline(&mut self) -> usize {
        info!("Establishing baseline of currently online users");
        let response = self.fetch_or_empty();
        let seeded = self.sessions.seed_baseline(&response.sessions);
        info!(
            users = seeded,
            "Baseline established; monitoring for new sign-ons"
        );
        seeded
    }

    pub fn run_cycle(&mut self) -> CycleReport {
        let mut report = CycleReport::default();
        let response = match self.source.fetch() {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "Failed to fetch online users");
                report.fetch_failed = true;
                SessionsResponse::default()
            }
        };

        let online: HashSet<&str> = response
            .sessions
            .iter()
            .filter_map(SessionEntry::identity)
            .collect();
        report.online = online.len();

        for screen_name in self.sessions.purge(&online) {
            info!(screen_name = %screen_name, "User signed off");
            report.signed_off += 1;
        }

        let window = self.policy.cooldown_window;
        for screen_name in self.cooldown.expire(&online, window, self.clock.now()) {
            info!(
                screen_name = %screen_name,
                cooldown_minutes = window.num_minutes(),
                "Removing offline user from cooldown tracking"
            );
            report.cooldowns_expired += 1;
        }

        for entry in &response.sessions {
            let Some((screen_name, transition)) = self.sessions.observe(entry) else {
                debug!(entry = ?entry, "Skipping incomplete session entry");
                report.malformed += 1;
                continue;
            };

            match transition {
                Transition::StillOnline => {
                    report.still_online += 1;
                    continue;
                }
                Transition::SignedOn => {
                    info!(screen_name = %screen_name, "New user detected");
                    report.signed_on += 1;
                }
                Transition::ReSignedOn => {
                    info!(screen_name = %screen_name, "User re-signed on");
                    report.re_signed_on += 1;
                }
            }

            let outcome = dispatch(
                &self.policy,
                &mut self.cooldown,
                &self.notifier,
                &self.clock,
                screen_name,
                entry.is_icq,
            );
            report.tally(&outcome);
        }

        debug!(
            online = report.online,
            signed_on = report.signed_on,
            re_signed_on = report.re_signed_on,
            signed_off = report.signed_off,
            sent = report.sent,
            suppressed = report.suppressed,
            failed = report.failed,
            tracked_sessions = self.sessions.len(),
            tracked_cooldowns = self.cooldown.len(),
            "Poll cycle complete"
        );
        report
    }

    /// Runs the baseline (when configured) followed by a single cycle.
    pub fn run_once(&mut self) -> CycleReport {
        if self.baseline_on_startup {
            self.establish_baseline();
        }
        self.run_cycle()
    }

    /// Polls until `shutdown` fires. The interval is measured from the end of
    /// one cycle to the start of the next.
    pub fn run(&mut self, shutdown: &ShutdownSignal) {
        if self.baseline_on_startup && !shutdown.is_triggered() {
            self.establish_baseline();
        }
        while !shutdown.is_triggered() {
            self.run_cycle();
            if shutdown.wait(self.poll_interval) {
                break;
            }
        }
        info!("Shutdown requested; monitor stopped");
    }

    fn fetch_or_empty(&self) -> SessionsResponse {
        self.source.fetch().unwrap_or_else(|err| {
            warn!(error = %err, "Failed to fetch online users");
            SessionsResponse::default()
        })
    }
}
