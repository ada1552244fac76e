//! Single-attempt event delivery to the collector.

use crate::{HttpRequest, OutboxError, OutboxResult, Transport};
use std::sync::Arc;
use tracing::{debug, warn};

/// Posts encoded events to the collector endpoint.
///
/// One call is one HTTP attempt. Retrying is the retry queue's job.
#[derive(Clone)]
pub struct EventSender {
    transport: Arc<dyn Transport>,
    endpoint: String,
    user_agent: String,
}

impl EventSender {
    pub fn new(
        transport: Arc<dyn Transport>,
        endpoint: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
            user_agent: user_agent.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Deliver an encoded event.
    ///
    /// Any status below 500 counts as delivered. 4xx responses are logged
    /// but not retried, since resending the same payload cannot succeed.
    pub async fn deliver(&self, payload: &str) -> OutboxResult<()> {
        let request = HttpRequest {
            url: self.endpoint.clone(),
            headers: vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("User-Agent".to_string(), self.user_agent.clone()),
            ],
            body: payload.as_bytes().to_vec(),
        };

        debug!(url = %self.endpoint, bytes = payload.len(), "Sending event");

        let status = self.transport.post(request).await?;
        if status >= 500 {
            return Err(OutboxError::Server(status));
        }
        if status >= 400 {
            warn!(status, "Collector rejected event, not retrying");
        }
        Ok(())
    }
}
