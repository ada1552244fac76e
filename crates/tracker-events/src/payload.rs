//! Built events and their JSON payload.

use crate::{random_id, Attributes, PayloadError, PayloadResult};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Wire schema version, sent as `v`.
pub const SCHEMA_VERSION: u32 = 1;

/// URL reported when the host has not set one.
const UNKNOWN_URL: &str = "unknown";

/// Identity and configuration snapshot an event is built from.
#[derive(Debug, Clone, Copy)]
pub struct EventContext<'a> {
    pub company_id: &'a str,
    pub current_url: Option<&'a str>,
    pub tmp_id: &'a str,
    pub user_id: Option<&'a str>,
}

/// The canonical wire record.
///
/// Built once, then either sent or encoded into the retry queue. Never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuiltEvent {
    /// Company id.
    pub key: String,
    pub name: String,
    pub url: String,
    pub tmp_id: String,
    /// Identified user; omitted from the JSON object when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    pub data: Attributes,
    pub event_id: String,
    pub v: u32,
    /// Milliseconds since the Unix epoch at construction time.
    pub timestamp: i64,
}

impl BuiltEvent {
    /// Build an event stamped with a fresh id and the current time.
    pub fn new(context: &EventContext<'_>, name: impl Into<String>, data: Attributes) -> Self {
        Self::at(context, name, data, Utc::now().timestamp_millis())
    }

    /// Build an event with an explicit timestamp.
    pub fn at(
        context: &EventContext<'_>,
        name: impl Into<String>,
        data: Attributes,
        timestamp: i64,
    ) -> Self {
        Self {
            key: context.company_id.to_string(),
            name: name.into(),
            url: context.current_url.unwrap_or(UNKNOWN_URL).to_string(),
            tmp_id: context.tmp_id.to_string(),
            client_id: context.user_id.map(str::to_string),
            data,
            event_id: random_id(),
            v: SCHEMA_VERSION,
            timestamp,
        }
    }

    /// Milliseconds elapsed between construction and `now_ms`.
    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms - self.timestamp
    }
}

/// Encode an event into its JSON payload.
///
/// Fails on non-finite numbers, which serde_json would otherwise write as
/// `null` and silently change the attribute on decode.
pub fn encode_event(event: &BuiltEvent) -> PayloadResult<String> {
    if let Some((key, _)) = event.data.iter().find(|(_, value)| !value.is_encodable()) {
        return Err(PayloadError::NonFiniteNumber(key.clone()));
    }
    Ok(serde_json::to_string(event)?)
}

/// Decode a JSON payload back into an event.
pub fn decode_event(payload: &str) -> PayloadResult<BuiltEvent> {
    Ok(serde_json::from_str(payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AttributeValue, TrackEvent};
    use serde_json::{json, Value};

    fn context<'a>(user_id: Option<&'a str>, url: Option<&'a str>) -> EventContext<'a> {
        EventContext {
            company_id: "acme",
            current_url: url,
            tmp_id: "tmp-123",
            user_id,
        }
    }

    #[test]
    fn test_page_view_defaults() {
        let (name, data) = TrackEvent::page_view().build();
        let event = BuiltEvent::new(&context(None, None), name, data);

        assert_eq!(event.key, "acme");
        assert_eq!(event.name, "page_view");
        assert_eq!(event.url, "unknown");
        assert_eq!(event.tmp_id, "tmp-123");
        assert!(event.client_id.is_none());
        assert!(event.data.is_empty());
        assert_eq!(event.v, 1);
        assert_eq!(event.event_id.len(), crate::RANDOM_ID_LEN);
    }

    #[test]
    fn test_client_id_is_omitted_when_absent() {
        let event = BuiltEvent::at(&context(None, None), "page_view", Attributes::new(), 1_000);
        let value: Value = serde_json::from_str(&encode_event(&event).unwrap()).unwrap();

        let object = value.as_object().unwrap();
        assert!(!object.contains_key("clientId"));
        assert_eq!(object["tmpId"], json!("tmp-123"));
        assert_eq!(object["url"], json!("unknown"));
        assert_eq!(object["v"], json!(1));
        assert_eq!(object["timestamp"], json!(1_000));
        assert_eq!(object["data"], json!({}));
    }

    #[test]
    fn test_wire_field_names() {
        let (name, data) = TrackEvent::purchase(["p1"], 9.99, None).build();
        let event = BuiltEvent::at(
            &context(Some("user-7"), Some("https://shop.example.com/cart")),
            name,
            data,
            1_700_000_000_000,
        );

        let value: Value = serde_json::from_str(&encode_event(&event).unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "key": "acme",
                "name": "purchase",
                "url": "https://shop.example.com/cart",
                "tmpId": "tmp-123",
                "clientId": "user-7",
                "data": { "ids": ["p1"], "transId": null, "value": 9.99 },
                "eventId": event.event_id,
                "v": 1,
                "timestamp": 1_700_000_000_000i64,
            })
        );
    }

    #[test]
    fn test_encode_decode_preserves_event() {
        let (name, data) = TrackEvent::product_page(["p1", "p2"])
            .with_label("lang", "en_US")
            .build();
        let event = BuiltEvent::new(&context(Some("u"), Some("https://x")), name, data);

        let decoded = decode_event(&encode_event(&event).unwrap()).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn test_encode_rejects_non_finite_numbers() {
        let (name, data) = TrackEvent::purchase(["p1"], f64::NAN, None).build();
        let event = BuiltEvent::new(&context(None, None), name, data);

        match encode_event(&event) {
            Err(PayloadError::NonFiniteNumber(key)) => assert_eq!(key, "value"),
            other => panic!("expected NonFiniteNumber, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_rejects_malformed_payloads() {
        assert!(decode_event("not json").is_err());
        assert!(decode_event(r#"{"key":"acme"}"#).is_err());
        assert!(decode_event(r#"["a","b"]"#).is_err());
    }

    #[test]
    fn test_decode_reads_null_attribute_as_missing_string() {
        let payload = r#"{"key":"acme","name":"x","url":"unknown","tmpId":"t","data":{"a":null,"b":3},"eventId":"e","v":1,"timestamp":5}"#;
        let event = decode_event(payload).unwrap();

        assert_eq!(event.data["a"], AttributeValue::String(None));
        assert_eq!(event.data["b"], AttributeValue::Number(3.0));
        assert!(event.client_id.is_none());
    }

    #[test]
    fn test_age_ms() {
        let event = BuiltEvent::at(&context(None, None), "x", Attributes::new(), 10_000);
        assert_eq!(event.age_ms(70_000), 60_000);
    }

    #[test]
    fn test_event_ids_are_unique() {
        let ctx = context(None, None);
        let a = BuiltEvent::new(&ctx, "x", Attributes::new());
        let b = BuiltEvent::new(&ctx, "x", Attributes::new());
        assert_ne!(a.event_id, b.event_id);
    }
}
