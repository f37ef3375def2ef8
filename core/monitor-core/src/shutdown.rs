//! Interrupt flag the poll loop can sleep on.

use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        let (flag, condvar) = &*self.inner;
        let mut triggered = flag.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *triggered = true;
        condvar.notify_all();
    }

    pub fn is_triggered(&self) -> bool {
        let (flag, _) = &*self.inner;
        *flag.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Sleeps up to `timeout`, waking early on shutdown. Returns `true` when
    /// shutdown was requested. A timeout too large to add to the current
    /// instant waits until shutdown.
    pub fn wait(&self, timeout: Duration) -> bool {
        let (flag, condvar) = &*self.inner;
        let deadline = Instant::now().checked_add(timeout);
        let mut triggered = flag.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        while !*triggered {
            let Some(deadline) = deadline else {
                triggered = condvar
                    .wait(triggered)
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                continue;
            };
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, _) = condvar
                .wait_timeout(triggered, deadline - now)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            triggered = guard;
        }
        true
    }
}
