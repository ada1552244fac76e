//! Event model for the rlvt tracker.
//!
//! - [`AttributeValue`]: the value union carried in an event's `data` map
//! - [`TrackEvent`]: typed event requests and their mapping to a name plus
//!   attribute map
//! - [`BuiltEvent`]: the immutable wire record, with [`encode_event`] and
//!   [`decode_event`] for the JSON payload

mod attribute;
mod builder;
mod error;
mod ids;
mod payload;

pub use attribute::{AttributeValue, Attributes};
pub use builder::{event_names, Labels, TrackEvent};
pub use error::{PayloadError, PayloadResult};
pub use ids::{random_id, RANDOM_ID_LEN};
pub use payload::{decode_event, encode_event, BuiltEvent, EventContext, SCHEMA_VERSION};
