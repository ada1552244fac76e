//! Typed event requests.

use crate::{AttributeValue, Attributes};
use std::collections::BTreeMap;

/// Free-form string labels attached by the caller.
pub type Labels = BTreeMap<String, String>;

/// Wire names of the built-in events.
pub mod event_names {
    pub const PAGE_VIEW: &str = "page_view";
    pub const PRODUCT_PAGE: &str = "product_page";
    pub const CATEGORY_VIEW: &str = "category_view";
    pub const BRAND_VIEW: &str = "brand_view";
    pub const PRODUCT_HOVER: &str = "product_hover";
    pub const ADD_CART: &str = "add_cart";
    pub const PURCHASE: &str = "purchase";
    /// Sent by the tracker when the identified user changes.
    pub const IDENTIFY: &str = "identify";
}

/// Attribute keys injected by the builder. They overwrite labels of the same name.
const IDS_KEY: &str = "ids";
const VALUE_KEY: &str = "value";
const TRANS_ID_KEY: &str = "transId";

/// An event a host application wants to record.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackEvent {
    PageView {
        labels: Labels,
    },
    ProductPage {
        ids: Vec<String>,
        labels: Labels,
    },
    CategoryView {
        ids: Vec<String>,
        labels: Labels,
    },
    BrandView {
        ids: Vec<String>,
        labels: Labels,
    },
    ProductHover {
        ids: Vec<String>,
        labels: Labels,
    },
    AddCart {
        ids: Vec<String>,
        labels: Labels,
    },
    Purchase {
        ids: Vec<String>,
        total_amount: f64,
        trans_id: Option<String>,
        labels: Labels,
    },
    /// Any other event name, carrying only labels.
    Custom {
        name: String,
        labels: Labels,
    },
}

impl TrackEvent {
    pub fn page_view() -> Self {
        TrackEvent::PageView {
            labels: Labels::new(),
        }
    }

    pub fn product_page<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TrackEvent::ProductPage {
            ids: collect_ids(ids),
            labels: Labels::new(),
        }
    }

    pub fn category_view<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TrackEvent::CategoryView {
            ids: collect_ids(ids),
            labels: Labels::new(),
        }
    }

    pub fn brand_view<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TrackEvent::BrandView {
            ids: collect_ids(ids),
            labels: Labels::new(),
        }
    }

    pub fn product_hover<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TrackEvent::ProductHover {
            ids: collect_ids(ids),
            labels: Labels::new(),
        }
    }

    pub fn add_cart<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TrackEvent::AddCart {
            ids: collect_ids(ids),
            labels: Labels::new(),
        }
    }

    pub fn purchase<I, S>(ids: I, total_amount: f64, trans_id: Option<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TrackEvent::Purchase {
            ids: collect_ids(ids),
            total_amount,
            trans_id,
            labels: Labels::new(),
        }
    }

    pub fn custom(name: impl Into<String>) -> Self {
        TrackEvent::Custom {
            name: name.into(),
            labels: Labels::new(),
        }
    }

    /// Add a label, replacing any previous value under the same key.
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels_mut().insert(key.into(), value.into());
        self
    }

    /// Replace all labels.
    pub fn with_labels(mut self, labels: Labels) -> Self {
        *self.labels_mut() = labels;
        self
    }

    /// Wire name of the event.
    pub fn name(&self) -> &str {
        match self {
            TrackEvent::PageView { .. } => event_names::PAGE_VIEW,
            TrackEvent::ProductPage { .. } => event_names::PRODUCT_PAGE,
            TrackEvent::CategoryView { .. } => event_names::CATEGORY_VIEW,
            TrackEvent::BrandView { .. } => event_names::BRAND_VIEW,
            TrackEvent::ProductHover { .. } => event_names::PRODUCT_HOVER,
            TrackEvent::AddCart { .. } => event_names::ADD_CART,
            TrackEvent::Purchase { .. } => event_names::PURCHASE,
            TrackEvent::Custom { name, .. } => name,
        }
    }

    pub fn labels(&self) -> &Labels {
        match self {
            TrackEvent::PageView { labels }
            | TrackEvent::ProductPage { labels, .. }
            | TrackEvent::CategoryView { labels, .. }
            | TrackEvent::BrandView { labels, .. }
            | TrackEvent::ProductHover { labels, .. }
            | TrackEvent::AddCart { labels, .. }
            | TrackEvent::Purchase { labels, .. }
            | TrackEvent::Custom { labels, .. } => labels,
        }
    }

    fn labels_mut(&mut self) -> &mut Labels {
        match self {
            TrackEvent::PageView { labels }
            | TrackEvent::ProductPage { labels, .. }
            | TrackEvent::CategoryView { labels, .. }
            | TrackEvent::BrandView { labels, .. }
            | TrackEvent::ProductHover { labels, .. }
            | TrackEvent::AddCart { labels, .. }
            | TrackEvent::Purchase { labels, .. }
            | TrackEvent::Custom { labels, .. } => labels,
        }
    }

    /// Map the request to its wire name and attribute map.
    ///
    /// Labels become string attributes. Entity events add `ids`; purchases
    /// add `ids`, `value` and `transId`. Injected keys overwrite labels.
    pub fn build(self) -> (String, Attributes) {
        let name = self.name().to_string();

        let (labels, injected): (Labels, Vec<(&str, AttributeValue)>) = match self {
            TrackEvent::PageView { labels } | TrackEvent::Custom { labels, .. } => {
                (labels, Vec::new())
            }
            TrackEvent::ProductPage { ids, labels }
            | TrackEvent::CategoryView { ids, labels }
            | TrackEvent::BrandView { ids, labels }
            | TrackEvent::ProductHover { ids, labels }
            | TrackEvent::AddCart { ids, labels } => {
                (labels, vec![(IDS_KEY, AttributeValue::StringList(ids))])
            }
            TrackEvent::Purchase {
                ids,
                total_amount,
                trans_id,
                labels,
            } => (
                labels,
                vec![
                    (IDS_KEY, AttributeValue::StringList(ids)),
                    (VALUE_KEY, AttributeValue::Number(total_amount)),
                    (TRANS_ID_KEY, AttributeValue::String(trans_id)),
                ],
            ),
        };

        let mut attributes: Attributes = labels
            .into_iter()
            .map(|(key, value)| (key, AttributeValue::String(Some(value))))
            .collect();
        for (key, value) in injected {
            attributes.insert(key.to_string(), value);
        }

        (name, attributes)
    }
}

fn collect_ids<I, S>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    ids.into_iter().map(Into::into).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_view_with_empty_labels() {
        let (name, data) = TrackEvent::page_view().build();
        assert_eq!(name, "page_view");
        assert!(data.is_empty());
    }

    #[test]
    fn test_product_page_merges_labels_and_ids() {
        let (name, data) = TrackEvent::product_page(["p1"])
            .with_label("lang", "en_US")
            .build();

        assert_eq!(name, "product_page");
        assert_eq!(data.len(), 2);
        assert_eq!(data["lang"], AttributeValue::from("en_US"));
        assert_eq!(data["ids"], AttributeValue::StringList(vec!["p1".to_string()]));
    }

    #[test]
    fn test_purchase_injects_value_and_null_trans_id() {
        let (name, data) = TrackEvent::purchase(["p1"], 9.99, None).build();

        assert_eq!(name, "purchase");
        assert_eq!(data.len(), 3);
        assert_eq!(data["ids"], AttributeValue::StringList(vec!["p1".to_string()]));
        assert_eq!(data["value"], AttributeValue::Number(9.99));
        assert_eq!(data["transId"], AttributeValue::String(None));
    }

    #[test]
    fn test_injected_keys_overwrite_labels() {
        let (_, data) = TrackEvent::purchase(["p1", "p2"], 20.0, Some("T-1".into()))
            .with_label("ids", "from-label")
            .with_label("value", "0")
            .with_label("transId", "label-trans")
            .with_label("channel", "web")
            .build();

        assert_eq!(
            data["ids"],
            AttributeValue::StringList(vec!["p1".to_string(), "p2".to_string()])
        );
        assert_eq!(data["value"], AttributeValue::Number(20.0));
        assert_eq!(data["transId"], AttributeValue::from("T-1"));
        assert_eq!(data["channel"], AttributeValue::from("web"));
    }

    #[test]
    fn test_entity_event_names() {
        assert_eq!(TrackEvent::category_view(["c"]).name(), "category_view");
        assert_eq!(TrackEvent::brand_view(["b"]).name(), "brand_view");
        assert_eq!(TrackEvent::product_hover(["p"]).name(), "product_hover");
        assert_eq!(TrackEvent::add_cart(["p"]).name(), "add_cart");
    }

    #[test]
    fn test_custom_event_keeps_labels_only() {
        let mut labels = Labels::new();
        labels.insert("step".to_string(), "2".to_string());

        let event = TrackEvent::custom("checkout_step").with_labels(labels.clone());
        assert_eq!(event.labels(), &labels);

        let (name, data) = event.build();
        assert_eq!(name, "checkout_step");
        assert_eq!(data["step"], AttributeValue::from("2"));
    }
}
