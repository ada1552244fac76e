//! Publish path and retry tick.

use crate::{EventSender, IdentityState, OutboxError, RetryQueue};
use chrono::Utc;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, error, warn};
use tracker_config_and_utils::TrackerConfig;
use tracker_events::{decode_event, encode_event, Attributes, BuiltEvent, EventContext};

/// How the retry scheduler drains the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Time between ticks.
    pub interval: Duration,
    /// Queued events older than this are dropped instead of resent.
    pub max_event_age: Duration,
    /// Entries popped per tick.
    pub entries_per_tick: usize,
}

impl RetryPolicy {
    pub fn from_config(config: &TrackerConfig) -> Self {
        Self {
            interval: config.retry_interval(),
            max_event_age: config.max_event_age(),
            entries_per_tick: config.retries_per_tick.max(1),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            max_event_age: Duration::from_secs(15 * 60),
            entries_per_tick: 1,
        }
    }
}

/// What one retry tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Resent and accepted by the collector.
    pub delivered: usize,
    /// Resent, failed again, and pushed back onto the tail.
    pub requeued: usize,
    /// Resent and failed with an error that retrying cannot fix; dropped.
    pub rejected: usize,
    /// Older than the retry window; dropped without a request.
    pub dropped_stale: usize,
    /// Could not be decoded; dropped.
    pub dropped_malformed: usize,
}

impl TickReport {
    /// Number of entries taken off the queue.
    pub fn popped(&self) -> usize {
        self.delivered + self.requeued + self.rejected + self.dropped_stale + self.dropped_malformed
    }
}

/// Result of one delivery attempt.
enum SendOutcome {
    Delivered,
    Rejected,
    Retryable,
}

enum RetryOutcome {
    Delivered,
    Requeue(String),
    Rejected,
    Stale,
    Malformed,
}

/// State shared by the public tracker handle and the retry scheduler.
pub(crate) struct Delivery {
    company_id: String,
    current_url: RwLock<Option<String>>,
    pub(crate) identity: IdentityState,
    pub(crate) queue: RetryQueue,
    sender: EventSender,
    policy: RetryPolicy,
}

impl Delivery {
    pub(crate) fn new(
        config: &TrackerConfig,
        identity: IdentityState,
        queue: RetryQueue,
        sender: EventSender,
    ) -> Self {
        Self {
            company_id: config.company_id.clone(),
            current_url: RwLock::new(config.current_url.clone()),
            identity,
            queue,
            sender,
            policy: RetryPolicy::from_config(config),
        }
    }

    pub(crate) fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub(crate) fn endpoint(&self) -> &str {
        self.sender.endpoint()
    }

    pub(crate) fn current_url(&self) -> Option<String> {
        self.current_url
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn set_current_url(&self, url: Option<String>) {
        *self
            .current_url
            .write()
            .unwrap_or_else(PoisonError::into_inner) = url;
    }

    /// Build an event from the current identity and configuration snapshot.
    pub(crate) fn build_event(&self, name: &str, data: Attributes) -> BuiltEvent {
        let tmp_id = self.identity.ensure_tmp_id();
        let user_id = self.identity.user_id();
        self.build_event_as(name, data, &tmp_id, user_id.as_deref())
    }

    /// Build an event for an identity the caller already holds.
    pub(crate) fn build_event_as(
        &self,
        name: &str,
        data: Attributes,
        tmp_id: &str,
        user_id: Option<&str>,
    ) -> BuiltEvent {
        let current_url = self.current_url();
        let context = EventContext {
            company_id: &self.company_id,
            current_url: current_url.as_deref(),
            tmp_id,
            user_id,
        };
        BuiltEvent::new(&context, name, data)
    }

    /// Encode and send one built event. Failures never reach the caller.
    pub(crate) async fn publish(&self, event: BuiltEvent) {
        let payload = match encode_event(&event) {
            Ok(payload) => payload,
            Err(e) => {
                let err = OutboxError::Encoding(e);
                error!(event_id = %event.event_id, name = %event.name, error = %err, "Dropping event that cannot be encoded");
                return;
            }
        };

        match self.attempt(&event, &payload).await {
            SendOutcome::Delivered => {
                debug!(event_id = %event.event_id, name = %event.name, "Event delivered");
            }
            SendOutcome::Rejected => {}
            SendOutcome::Retryable => self.enqueue(&event, payload).await,
        }
    }

    /// Send an encoded event once and classify the result.
    async fn attempt(&self, event: &BuiltEvent, payload: &str) -> SendOutcome {
        match self.sender.deliver(payload).await {
            Ok(()) => SendOutcome::Delivered,
            Err(err) if err.is_retryable() => {
                warn!(event_id = %event.event_id, name = %event.name, error = %err, "Event delivery failed");
                SendOutcome::Retryable
            }
            Err(err) => {
                error!(event_id = %event.event_id, name = %event.name, error = %err, "Event delivery failed permanently");
                SendOutcome::Rejected
            }
        }
    }

    /// Append an encoded event to the retry queue.
    async fn enqueue(&self, event: &BuiltEvent, payload: String) {
        match self.queue.push(payload).await {
            Ok(queue_len) => {
                debug!(event_id = %event.event_id, queue_len, "Event queued for retry");
            }
            Err(e) => {
                error!(event_id = %event.event_id, name = %event.name, error = %e, "Event could not be queued for retry");
            }
        }
    }

    /// Run one scheduler tick against the current clock.
    pub(crate) async fn retry_tick(&self) -> TickReport {
        self.retry_tick_at(Utc::now().timestamp_millis()).await
    }

    /// Pop up to `entries_per_tick` entries and resend the ones still fresh.
    ///
    /// Entries that fail again go back on the tail only after the tick, so
    /// no entry is attempted twice in one tick.
    pub(crate) async fn retry_tick_at(&self, now_ms: i64) -> TickReport {
        let mut report = TickReport::default();
        let mut requeue = Vec::new();

        for _ in 0..self.policy.entries_per_tick {
            let entry = match self.queue.pop_front().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    error!(error = %e, "Failed to read retry queue");
                    break;
                }
            };

            match self.retry_entry(entry, now_ms).await {
                RetryOutcome::Delivered => report.delivered += 1,
                RetryOutcome::Requeue(entry) => requeue.push(entry),
                RetryOutcome::Rejected => report.rejected += 1,
                RetryOutcome::Stale => report.dropped_stale += 1,
                RetryOutcome::Malformed => report.dropped_malformed += 1,
            }
        }

        for entry in requeue {
            match self.queue.push(entry).await {
                Ok(_) => report.requeued += 1,
                Err(e) => error!(error = %e, "Failed to requeue event"),
            }
        }

        if report.popped() > 0 {
            debug!(
                delivered = report.delivered,
                requeued = report.requeued,
                rejected = report.rejected,
                dropped_stale = report.dropped_stale,
                dropped_malformed = report.dropped_malformed,
                "Retry tick finished"
            );
        }
        report
    }

    async fn retry_entry(&self, entry: String, now_ms: i64) -> RetryOutcome {
        let event = match decode_event(&entry) {
            Ok(event) => event,
            Err(e) => {
                let err = OutboxError::Decoding(e);
                error!(error = %err, "Dropping malformed retry queue entry");
                return RetryOutcome::Malformed;
            }
        };

        let age_ms = event.age_ms(now_ms);
        let max_age_ms = i64::try_from(self.policy.max_event_age.as_millis()).unwrap_or(i64::MAX);
        if age_ms > max_age_ms {
            let err = OutboxError::StaleEvent {
                event_id: event.event_id.clone(),
                age_ms,
            };
            warn!(name = %event.name, error = %err, "Dropping stale event");
            return RetryOutcome::Stale;
        }

        // Resend the original bytes; the event is never rebuilt.
        match self.attempt(&event, &entry).await {
            SendOutcome::Delivered => {
                debug!(event_id = %event.event_id, age_ms, "Retried event delivered");
                RetryOutcome::Delivered
            }
            SendOutcome::Rejected => RetryOutcome::Rejected,
            SendOutcome::Retryable => RetryOutcome::Requeue(entry),
        }
    }
}
