//! Public delivery engine.

use crate::delivery::Delivery;
use crate::scheduler::RetryScheduler;
use crate::{
    EventSender, IdentityState, OutboxError, OutboxResult, RetryPolicy, RetryQueue, TickReport,
    Transport,
};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracker_config_and_utils::TrackerConfig;
use tracker_events::{event_names, Attributes, BuiltEvent, Labels, TrackEvent};
use tracker_storage::{DeviceIdProvider, DurableStore};

/// Telemetry tracker.
///
/// Turns [`TrackEvent`]s into wire payloads and posts them to the
/// collector. Delivery is fire-and-forget: `send` returns immediately and
/// the outcome is never reported back. Events that fail with a transport
/// error or a 5xx response are persisted and retried by a background task
/// that drains the queue on a fixed interval.
///
/// # Lifecycle
///
/// 1. Create with [`Tracker::initialize()`] inside a Tokio runtime
/// 2. Record events with [`Tracker::send()`] from any thread
/// 3. Call [`Tracker::shutdown()`] (or drop the tracker) to stop retrying
///
/// # Example
///
/// ```ignore
/// let tracker = Tracker::initialize(config, store, device_ids, transport)?;
/// tracker.set_user("customer-42");
/// tracker.send(TrackEvent::product_page(["sku-1"]).with_label("lang", "en_US"));
/// ```
pub struct Tracker {
    delivery: Arc<Delivery>,
    scheduler: RetryScheduler,
    runtime: Handle,
}

impl Tracker {
    /// Validate the configuration, make sure a `tmpId` exists, and start
    /// the retry scheduler on the current Tokio runtime.
    pub fn initialize(
        config: TrackerConfig,
        store: Arc<dyn DurableStore>,
        device_ids: Arc<dyn DeviceIdProvider>,
        transport: Arc<dyn Transport>,
    ) -> OutboxResult<Self> {
        let runtime = Handle::try_current().map_err(|_| OutboxError::NoRuntime)?;
        Self::initialize_on(config, store, device_ids, transport, runtime)
    }

    /// Same as [`Tracker::initialize()`] with an explicit runtime handle.
    pub fn initialize_on(
        config: TrackerConfig,
        store: Arc<dyn DurableStore>,
        device_ids: Arc<dyn DeviceIdProvider>,
        transport: Arc<dyn Transport>,
        runtime: Handle,
    ) -> OutboxResult<Self> {
        config.validate()?;

        let identity = IdentityState::new(store.clone(), device_ids);
        identity.ensure_tmp_id();

        let sender = EventSender::new(transport, config.endpoint(), config.user_agent.clone());
        let delivery = Arc::new(Delivery::new(
            &config,
            identity,
            RetryQueue::new(store),
            sender,
        ));
        let scheduler = RetryScheduler::spawn(delivery.clone(), &runtime);

        info!(
            company_id = %config.company_id,
            endpoint = %delivery.endpoint(),
            retry_interval_secs = config.retry_interval_secs,
            "Tracker initialized"
        );

        Ok(Self {
            delivery,
            scheduler,
            runtime,
        })
    }

    /// Record an event.
    ///
    /// The payload is built on the calling thread from the identity and
    /// current URL at the time of the call. Returns immediately. The handle
    /// only tells when the dispatch has finished; it carries no delivery
    /// result and may be ignored.
    pub fn send(&self, event: TrackEvent) -> JoinHandle<()> {
        let (name, data) = event.build();
        let event = self.delivery.build_event(&name, data);
        self.dispatch(event)
    }

    /// Record a custom-named event carrying only labels.
    pub fn track(&self, name: impl Into<String>, labels: Labels) -> JoinHandle<()> {
        self.send(TrackEvent::custom(name).with_labels(labels))
    }

    /// Identify the current user.
    ///
    /// When the id differs from the stored one it is persisted and an
    /// `identify` event is sent; the returned handle tracks that send.
    /// Setting the same id again does nothing and returns `None`.
    pub fn set_user(&self, user_id: impl Into<String>) -> Option<JoinHandle<()>> {
        let user_id = user_id.into();
        let identify = self
            .delivery
            .identity
            .set_user_then(&user_id, |tmp_id, user_id| {
                self.delivery.build_event_as(
                    event_names::IDENTIFY,
                    Attributes::new(),
                    tmp_id,
                    Some(user_id),
                )
            });

        match identify {
            Ok(Some(event)) => Some(self.dispatch(event)),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Failed to store user id");
                None
            }
        }
    }

    /// Update the URL attached to subsequent events. No I/O.
    pub fn set_current_url(&self, url: impl Into<String>) {
        self.delivery.set_current_url(Some(url.into()));
    }

    pub fn current_url(&self) -> Option<String> {
        self.delivery.current_url()
    }

    pub fn tmp_id(&self) -> Option<String> {
        self.delivery.identity.tmp_id()
    }

    pub fn user_id(&self) -> Option<String> {
        self.delivery.identity.user_id()
    }

    pub fn endpoint(&self) -> &str {
        self.delivery.endpoint()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.delivery.policy()
    }

    /// Number of events waiting in the retry queue.
    pub async fn pending_retries(&self) -> OutboxResult<usize> {
        self.delivery.queue.len().await
    }

    /// Run one retry tick now instead of waiting for the scheduler.
    pub async fn process_retry_queue(&self) -> TickReport {
        self.delivery.retry_tick().await
    }

    /// Remove `tmpId`, `userId` and the retry queue from the store.
    ///
    /// The scheduler keeps running. The next event generates a new `tmpId`.
    pub async fn clear_storage(&self) -> OutboxResult<()> {
        self.delivery.identity.clear()?;
        self.delivery.queue.clear().await?;
        info!("Tracker storage cleared");
        Ok(())
    }

    /// Stop the retry scheduler. In-flight sends are left to finish.
    pub fn shutdown(&self) {
        self.scheduler.stop();
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    fn dispatch(&self, event: BuiltEvent) -> JoinHandle<()> {
        let delivery = self.delivery.clone();
        self.runtime.spawn(async move {
            delivery.publish(event).await;
        })
    }

    #[cfg(test)]
    pub(crate) async fn process_retry_queue_at(&self, now_ms: i64) -> TickReport {
        self.delivery.retry_tick_at(now_ms).await
    }
}
