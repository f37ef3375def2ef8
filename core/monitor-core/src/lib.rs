//! Core logic for signon-monitor.
//!
//! Polls a presence API, detects users who signed on (or whose session was
//! reset) and sends them a message, at most once per cooldown window. All
//! state is in memory and owned by a single [`Monitor`].

pub mod adapters;
pub mod config;
pub mod cooldown;
pub mod dispatch;
pub mod error;
pub mod monitor;
pub mod shutdown;
pub mod tracker;

pub use adapters::{Clock, Notifier, PresenceSource, SystemClock};
pub use config::{load_config, MonitorConfig};
pub use cooldown::{CooldownGuard, Eligibility};
pub use dispatch::{DispatchOutcome, DispatchPolicy};
pub use error::{ConfigError, NotifyError, SourceError};
pub use monitor::{CycleReport, Monitor};
pub use shutdown::ShutdownSignal;
pub use tracker::{SessionTracker, Transition};

pub use signon_presence_protocol as protocol;
