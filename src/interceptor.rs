//! Interception boundary.
//!
//! The host networking layer hands every outgoing request to an
//! [`Interceptor`]. [`StubInterceptor`] resolves it against a
//! [`StubRegistry`] synchronously, then applies any artificial delay as an
//! async deferral before delivering the outcome.

use crate::error::StubError;
use crate::registry::{default_registry, StubRegistry};
use crate::request::Request;
use crate::response::StubResult;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Contract between the engine and the host's request interception hook.
#[async_trait]
pub trait Interceptor: Send + Sync {
    /// Interceptor name for logs.
    fn name(&self) -> &str;

    /// Whether this interceptor claims `request`.
    fn can_handle(&self, request: &Request) -> bool;

    /// Produce the response or error for `request`.
    async fn start(&self, request: Request) -> StubResult;

    /// Cancel deliveries still waiting on an artificial delay.
    fn stop(&self);
}

/// Interceptor backed by a stub registry.
pub struct StubInterceptor {
    registry: Arc<StubRegistry>,
    /// Bumped on every `stop()`; pending deliveries watch for the change.
    cancel: watch::Sender<u64>,
}

impl StubInterceptor {
    pub fn new(registry: Arc<StubRegistry>) -> Self {
        let (cancel, _) = watch::channel(0);
        Self { registry, cancel }
    }

    pub fn registry(&self) -> &Arc<StubRegistry> {
        &self.registry
    }
}

impl Default for StubInterceptor {
    /// Interceptor over the process-wide default registry.
    fn default() -> Self {
        Self::new(default_registry())
    }
}

#[async_trait]
impl Interceptor for StubInterceptor {
    fn name(&self) -> &str {
        "stub-networking"
    }

    fn can_handle(&self, request: &Request) -> bool {
        self.registry.can_handle(request)
    }

    async fn start(&self, request: Request) -> StubResult {
        // Subscribe before resolving so a stop() issued from here on is seen.
        let mut cancelled = self.cancel.subscribe();

        let response = self.registry.resolve(&request)?;

        let Some(delay) = response.delay else {
            return Ok(response);
        };
        let delay = delay.calculate();
        if delay.is_zero() {
            return Ok(response);
        }

        debug!(request = %request, delay_ms = delay.as_millis() as u64, "Applying delay");
        tokio::select! {
            _ = tokio::time::sleep(delay) => Ok(response),
            _ = cancelled.changed() => {
                debug!(request = %request, "Delivery cancelled");
                Err(StubError::transport("request cancelled"))
            }
        }
    }

    fn stop(&self) {
        self.cancel.send_modify(|generation| *generation += 1);
        debug!("Interceptor stopped");
    }
}
