//! Event delivery with a persisted retry queue.
//!
//! This crate provides:
//! - Tracker: the delivery engine host applications talk to
//! - RetryQueue: FIFO of encoded events persisted in the durable store
//! - a retry scheduler: periodic task draining the queue one tick at a time
//! - EventSender: single-attempt HTTP delivery over a pluggable Transport
//!
//! Delivery is fire-and-forget. Failures are logged and, for transport
//! errors and 5xx responses, queued for a later retry. Nothing is reported
//! back to the code that sent the event.

mod delivery;
mod error;
mod identity;
mod queue;
mod scheduler;
mod sender;
mod tracker;
mod transport;

#[cfg(test)]
mod tests;

pub use delivery::{RetryPolicy, TickReport};
pub use error::{OutboxError, OutboxResult};
pub use identity::IdentityState;
pub use queue::RetryQueue;
pub use sender::EventSender;
pub use tracker::Tracker;
pub use transport::{HttpRequest, ReqwestTransport, Transport};

pub use tracker_config_and_utils::TrackerConfig;
pub use tracker_events::{AttributeValue, Attributes, Labels, TrackEvent};
