use std::thread;
use std::time::Duration;

use bus::{ActionRequest, ActionResponse};
use core_types::TabId;

use crate::connector::{Connector, InjectError};

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    #[error("failed to load the page script: {0}")]
    InjectFailed(#[source] InjectError),
    #[error("could not reach the page after {attempts} attempts")]
    Unreachable { attempts: u32 },
    #[error("the page did not respond")]
    NoResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// Sends action requests, re-injecting the page component when it is missing.
///
/// A failed delivery triggers an inject, a fixed delay and another try, at most
/// `max_retries` times before giving up.
pub struct MessageClient<C> {
    connector: C,
    policy: RetryPolicy,
}

impl<C: Connector> MessageClient<C> {
    pub fn new(connector: C) -> Self {
        Self::with_policy(connector, RetryPolicy::default())
    }

    pub fn with_policy(connector: C, policy: RetryPolicy) -> Self {
        Self { connector, policy }
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub fn connector_mut(&mut self) -> &mut C {
        &mut self.connector
    }

    pub fn into_connector(self) -> C {
        self.connector
    }

    pub fn send(&mut self, tab: TabId, request: &ActionRequest) -> Result<ActionResponse, ClientError> {
        let mut retries = 0;
        loop {
            match self.connector.send(tab, request) {
                Ok(Some(response)) => return Ok(response),
                Ok(None) => return Err(ClientError::NoResponse),
                Err(err) if retries < self.policy.max_retries => {
                    log::debug!(
                        target: "veil.popup",
                        "{} not delivered ({err}); injecting, retry {}",
                        request.action_name(),
                        retries + 1
                    );
                    self.connector
                        .inject(tab)
                        .map_err(ClientError::InjectFailed)?;
                    thread::sleep(self.policy.delay);
                    retries += 1;
                }
                Err(err) => {
                    log::warn!(target: "veil.popup", "giving up on tab {tab}: {err}");
                    return Err(ClientError::Unreachable {
                        attempts: retries + 1,
                    });
                }
            }
        }
    }

    /// Like [`MessageClient::send`], with transport failures folded into a failed
    /// response the way the page reports its own errors.
    pub fn request(&mut self, tab: TabId, request: &ActionRequest) -> ActionResponse {
        self.send(tab, request).unwrap_or_else(|err| ActionResponse::Failed {
            error: err.to_string(),
        })
    }
}
