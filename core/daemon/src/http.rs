//! HTTP adapters for the presence API.
//!
//! One blocking client serves both the session listing and the message
//! endpoint. Every failure is mapped to a typed error; the monitor decides
//! whether it is fatal (it never is).

use monitor_core::protocol::{
    parse_sessions_bytes, InstantMessage, SessionsResponse, INSTANT_MESSAGE_PATH, SESSIONS_PATH,
};
use monitor_core::{MonitorConfig, Notifier, NotifyError, PresenceSource, SourceError};
use reqwest::blocking::Client;

#[derive(Debug, Clone)]
pub struct PresenceClient {
    client: Client,
    sessions_url: String,
    message_url: String,
}

impl PresenceClient {
    pub fn new(config: &MonitorConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("signon-monitor/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, &config.api.base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            sessions_url: format!("{}{}", base_url, SESSIONS_PATH),
            message_url: format!("{}{}", base_url, INSTANT_MESSAGE_PATH),
        }
    }
}

impl PresenceSource for PresenceClient {
    fn fetch(&self) -> Result<SessionsResponse, SourceError> {
        let url = &self.sessions_url;
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| SourceError::Request {
                url: url.clone(),
                details: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().map_err(|err| SourceError::Request {
            url: url.clone(),
            details: err.to_string(),
        })?;
        parse_sessions_bytes(&body).map_err(|err| SourceError::Decode {
            url: url.clone(),
            details: err.to_string(),
        })
    }
}

impl Notifier for PresenceClient {
    fn send(&self, message: &InstantMessage) -> Result<(), NotifyError> {
        let url = &self.message_url;
        let response = self
            .client
            .post(url)
            .json(message)
            .send()
            .map_err(|err| NotifyError::Request {
                url: url.clone(),
                details: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status {
                url: url.clone(),
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
