//! I/O seams used by the monitor: the presence API, the message API and the
//! wall clock. The daemon provides HTTP implementations; tests provide fakes.

use chrono::{DateTime, Utc};
use signon_presence_protocol::{InstantMessage, SessionsResponse};

use crate::error::{NotifyError, SourceError};

pub trait PresenceSource {
    fn fetch(&self) -> Result<SessionsResponse, SourceError>;
}

pub trait Notifier {
    fn send(&self, message: &InstantMessage) -> Result<(), NotifyError>;
}

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<T: PresenceSource + ?Sized> PresenceSource for &T {
    fn fetch(&self) -> Result<SessionsResponse, SourceError> {
        (**self).fetch()
    }
}

impl<T: Notifier + ?Sized> Notifier for &T {
    fn send(&self, message: &InstantMessage) -> Result<(), NotifyError> {
        (**self).send(message)
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}
