//! Per-control async service invocation.
//!
//! Each accepted request is spawned on the tokio runtime and tracked against
//! its control key. The key doubles as the control's loading flag: a control
//! is "loading" exactly while its task is in flight, which is what disables
//! the button and prevents a second click. The flag clears in `poll` on
//! every path out of the task, including a panic, so no control is ever left
//! permanently disabled.

use std::future::Future;

use futures::FutureExt;
use tokio::task::JoinHandle;

use crate::action::ActionRequest;
use crate::service::ServiceError;

/// Outcome of one invocation, reported back for the result toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResult {
    pub success: bool,
    pub error_message: Option<String>,
}

impl ActionResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            error_message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.is_empty() {
            "Unknown error".to_string()
        } else {
            message
        };
        Self {
            success: false,
            error_message: Some(message),
        }
    }
}

struct InFlight {
    key: String,
    request: ActionRequest,
    handle: JoinHandle<Result<(), ServiceError>>,
}

/// Tracks every in-flight service call by control key.
#[derive(Default)]
pub struct Dispatcher {
    in_flight: Vec<InFlight>,
}

impl Dispatcher {
    /// Whether the control identified by `key` has a call in flight.
    pub fn is_loading(&self, key: &str) -> bool {
        self.in_flight.iter().any(|entry| entry.key == key)
    }

    pub fn any_loading(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Spawn the service call for this request. Refused (returns false) when
    /// the same control already has a call in flight; different controls
    /// proceed independently.
    pub fn begin<F>(&mut self, request: ActionRequest, call: F) -> bool
    where
        F: Future<Output = Result<(), ServiceError>> + Send + 'static,
    {
        let key = request.control_key();
        if self.is_loading(&key) {
            tracing::warn!("Ignoring '{}': already in flight", key);
            return false;
        }

        let handle = tokio::spawn(call);
        self.in_flight.push(InFlight {
            key,
            request,
            handle,
        });
        true
    }

    /// Drain finished invocations, converting faults into failed results.
    pub fn poll(&mut self) -> Vec<(ActionRequest, ActionResult)> {
        let mut completed = Vec::new();

        let mut i = 0;
        while i < self.in_flight.len() {
            if !self.in_flight[i].handle.is_finished() {
                i += 1;
                continue;
            }

            let entry = self.in_flight.remove(i);
            let result = match entry.handle.now_or_never() {
                Some(Ok(Ok(()))) => ActionResult::ok(),
                Some(Ok(Err(e))) => {
                    tracing::error!("Service call '{}' failed: {}", entry.key, e);
                    ActionResult::failed(e.to_string())
                }
                Some(Err(e)) => {
                    tracing::error!("Service task '{}' panicked: {}", entry.key, e);
                    ActionResult::failed("Unknown error")
                }
                None => {
                    tracing::warn!("Task '{}' not ready despite is_finished()", entry.key);
                    ActionResult::failed("Unknown error")
                }
            };
            completed.push((entry.request, result));
        }

        completed
    }
}
