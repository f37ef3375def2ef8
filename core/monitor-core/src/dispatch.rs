//! Sign-on message dispatch.
//!
//! Gate order: ignore list, legacy (ICQ) transport, cooldown. Only a send that
//! returns without a transport error refreshes the cooldown.

use chrono::Duration;
use signon_presence_protocol::InstantMessage;
use std::collections::HashSet;
use std::thread;
use std::time::Duration as StdDuration;
use tracing::{info, warn};

use crate::adapters::{Clock, Notifier};
use crate::config::MonitorConfig;
use crate::cooldown::{format_remaining, CooldownGuard, Eligibility};
use crate::error::NotifyError;

#[derive(Debug, Clone)]
pub struct DispatchPolicy {
    pub sender: String,
    pub text: String,
    pub ignored_users: HashSet<String>,
    pub cooldown_window: Duration,
    /// Sleep before sending so the presence server finishes propagating the
    /// new session. Zero disables it.
    pub pre_dispatch_delay: StdDuration,
}

impl DispatchPolicy {
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self {
            sender: config.message.sender.clone(),
            text: config.message.text.clone(),
            ignored_users: config.message.ignored_users.iter().cloned().collect(),
            cooldown_window: config.cooldown_window(),
            pre_dispatch_delay: config.pre_dispatch_delay(),
        }
    }

    pub fn is_ignored(&self, screen_name: &str) -> bool {
        self.ignored_users.contains(screen_name)
    }

    fn message_for(&self, screen_name: &str) -> InstantMessage {
        InstantMessage {
            to: screen_name.to_string(),
            from: self.sender.clone(),
            text: self.text.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Sent,
    Ignored,
    LegacyTransport,
    CoolingDown { remaining: Duration },
    Failed(NotifyError),
}

pub fn dispatch<N, C>(
    policy: &DispatchPolicy,
    cooldown: &mut CooldownGuard,
    notifier: &N,
    clock: &C,
    screen_name: &str,
    is_icq: bool,
) -> DispatchOutcome
where
    N: Notifier + ?Sized,
    C: Clock + ?Sized,
{
    if policy.is_ignored(screen_name) {
        info!(screen_name = %screen_name, "Skipping ignored user");
        return DispatchOutcome::Ignored;
    }

    if is_icq {
        info!(screen_name = %screen_name, "Not sending message to ICQ user");
        return DispatchOutcome::LegacyTransport;
    }

    if let Eligibility::CoolingDown { remaining } =
        cooldown.check(screen_name, policy.cooldown_window, clock.now())
    {
        info!(
            screen_name = %screen_name,
            remaining = %format_remaining(remaining),
            "Skipping user, cooldown active"
        );
        return DispatchOutcome::CoolingDown { remaining };
    }

    if !policy.pre_dispatch_delay.is_zero() {
        thread::sleep(policy.pre_dispatch_delay);
    }

    match notifier.send(&policy.message_for(screen_name)) {
        Ok(()) => {
            cooldown.record(screen_name, clock.now());
            info!(screen_name = %screen_name, "Sent sign-on message");
            DispatchOutcome::Sent
        }
        Err(err) => {
            warn!(screen_name = %screen_name, error = %err, "Failed to send sign-on message");
            DispatchOutcome::Failed(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use std::cell::RefCell;
    use std::time::Instant;

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: RefCell<Vec<InstantMessage>>,
        fail: bool,
    }

    impl Notifier for RecordingNotifier {
        fn send(&self, message: &InstantMessage) -> Result<(), NotifyError> {
            self.sent.borrow_mut().push(message.clone());
            if self.fail {
                return Err(NotifyError::Status {
                    url: "http://presence.test/instant-message".to_string(),
                    status: 502,
                });
            }
            Ok(())
        }
    }

    fn policy() -> DispatchPolicy {
        DispatchPolicy {
            sender: "monitorbot".to_string(),
            text: "Welcome back".to_string(),
            ignored_users: ["mallory".to_string()].into_iter().collect(),
            cooldown_window: Duration::minutes(10),
            pre_dispatch_delay: StdDuration::ZERO,
        }
    }

    fn clock() -> FixedClock {
        FixedClock(
            DateTime::parse_from_rfc3339("2026-02-14T10:00:00Z")
                .expect("parse")
                .with_timezone(&Utc),
        )
    }

    #[test]
    fn sends_configured_message_and_records_cooldown() {
        let notifier = RecordingNotifier::default();
        let mut cooldown = CooldownGuard::new();
        let clock = clock();

        let outcome = dispatch(&policy(), &mut cooldown, &notifier, &clock, "alice", false);

        assert_eq!(outcome, DispatchOutcome::Sent);
        assert_eq!(
            notifier.sent.borrow().as_slice(),
            &[InstantMessage {
                to: "alice".to_string(),
                from: "monitorbot".to_string(),
                text: "Welcome back".to_string(),
            }]
        );
        assert_eq!(cooldown.last_messaged("alice"), Some(clock.0));
    }

    #[test]
    fn ignored_and_icq_users_never_reach_notifier() {
        let notifier = RecordingNotifier::default();
        let mut cooldown = CooldownGuard::new();
        let clock = clock();

        let ignored = dispatch(&policy(), &mut cooldown, &notifier, &clock, "mallory", false);
        let icq = dispatch(&policy(), &mut cooldown, &notifier, &clock, "123456", true);

        assert_eq!(ignored, DispatchOutcome::Ignored);
        assert_eq!(icq, DispatchOutcome::LegacyTransport);
        assert!(notifier.sent.borrow().is_empty());
        assert!(cooldown.is_empty());
    }

    #[test]
    fn cooldown_suppresses_without_refreshing_timer() {
        let notifier = RecordingNotifier::default();
        let mut cooldown = CooldownGuard::new();
        let clock = clock();
        let earlier = clock.0 - Duration::minutes(3);
        cooldown.record("alice", earlier);

        let outcome = dispatch(&policy(), &mut cooldown, &notifier, &clock, "alice", false);

        assert_eq!(
            outcome,
            DispatchOutcome::CoolingDown {
                remaining: Duration::minutes(7)
            }
        );
        assert!(notifier.sent.borrow().is_empty());
        assert_eq!(cooldown.last_messaged("alice"), Some(earlier));
    }

    #[test]
    fn failed_send_leaves_user_eligible() {
        let notifier = RecordingNotifier {
            fail: true,
            ..RecordingNotifier::default()
        };
        let mut cooldown = CooldownGuard::new();
        let clock = clock();

        let outcome = dispatch(&policy(), &mut cooldown, &notifier, &clock, "alice", false);

        assert!(matches!(outcome, DispatchOutcome::Failed(_)));
        assert_eq!(notifier.sent.borrow().len(), 1);
        assert!(cooldown.last_messaged("alice").is_none());
    }

    #[test]
    fn pre_dispatch_delay_applies_only_to_sends() {
        let notifier = RecordingNotifier::default();
        let mut cooldown = CooldownGuard::new();
        let clock = clock();
        let delay = StdDuration::from_millis(200);
        let delayed = DispatchPolicy {
            pre_dispatch_delay: delay,
            ..policy()
        };
        cooldown.record("carol", clock.0);

        let started = Instant::now();
        let ignored = dispatch(&delayed, &mut cooldown, &notifier, &clock, "mallory", false);
        let icq = dispatch(&delayed, &mut cooldown, &notifier, &clock, "123456", true);
        let cooling = dispatch(&delayed, &mut cooldown, &notifier, &clock, "carol", false);
        let gated = started.elapsed();

        assert_eq!(ignored, DispatchOutcome::Ignored);
        assert_eq!(icq, DispatchOutcome::LegacyTransport);
        assert!(matches!(cooling, DispatchOutcome::CoolingDown { .. }));
        assert!(gated < delay);

        let started = Instant::now();
        let sent = dispatch(&delayed, &mut cooldown, &notifier, &clock, "alice", false);
        assert_eq!(sent, DispatchOutcome::Sent);
        assert!(started.elapsed() >= delay);
        assert_eq!(notifier.sent.borrow().len(), 1);
    }
}
