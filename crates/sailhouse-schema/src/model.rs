//! Desired-state and remote-state types.
//!
//! The desired side ([`Schema`], [`Topic`], [`Subscription`]) is read from a
//! schema document; the remote side ([`RemoteState`]) is the snapshot the
//! service reports for one app and reconciliation key.

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::SchemaError;

/// Longest reconciliation key the service accepts.
pub const MAX_KEY_LEN: usize = 12;

static SLUG_REGEX: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^[a-z0-9-]+$").expect("Invalid slug regex"));

/// Returns true if `slug` only contains lowercase letters, digits or dashes.
pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_REGEX.is_match(slug)
}

/// Returns true if `endpoint` is an absolute HTTPS URL.
pub fn is_valid_endpoint(endpoint: &str) -> bool {
    endpoint.starts_with("https://") && Url::parse(endpoint).is_ok_and(|u| u.has_host())
}

/// Delivery mode of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionType {
    #[default]
    Pull,
    Push,
}

impl SubscriptionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pull => "pull",
            Self::Push => "push",
        }
    }
}

impl fmt::Display for SubscriptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `(path, value)` filter applied to message payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionFilter {
    pub path: String,
    pub value: String,
}

/// A topic declared in a schema document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub slug: String,
}

/// A subscription declared in a schema document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub slug: String,
    #[serde(rename = "topic")]
    pub topic_slug: String,
    #[serde(rename = "type")]
    pub kind: SubscriptionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<SubscriptionFilter>,
}

impl Subscription {
    /// Builds the create request for this subscription, tagged with `key`.
    pub fn to_new(&self, key: &str) -> NewSubscription {
        NewSubscription {
            slug: self.slug.clone(),
            topic_slug: self.topic_slug.clone(),
            kind: self.kind,
            endpoint: self.endpoint.clone(),
            schema_key: Some(key.to_string()),
            filter: self.filter.clone(),
        }
    }
}

/// Root of a schema document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Reconciliation namespace owning every topic and subscription below.
    pub key: String,
    #[serde(default)]
    pub topics: Vec<Topic>,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
}

impl Schema {
    pub fn topic(&self, slug: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.slug == slug)
    }

    pub fn subscription(&self, slug: &str) -> Option<&Subscription> {
        self.subscriptions.iter().find(|s| s.slug == slug)
    }

    /// Checks the structural rules a document must satisfy before diffing.
    ///
    /// Topic references are checked later, against desired and remote topics
    /// together, because a subscription may point at a topic that already
    /// exists remotely.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let key_len = self.key.chars().count();
        if key_len == 0 {
            return Err(SchemaError::validation("key must not be empty"));
        }
        if key_len > MAX_KEY_LEN {
            return Err(SchemaError::validation(format!(
                "key \"{}\" is {key_len} characters long, the maximum is {MAX_KEY_LEN}",
                self.key
            )));
        }

        let mut topics = HashSet::new();
        for topic in &self.topics {
            if !is_valid_slug(&topic.slug) {
                return Err(SchemaError::validation(format!(
                    "topic slug \"{}\" may only contain lowercase letters, numbers or dashes",
                    topic.slug
                )));
            }
            if !topics.insert(topic.slug.as_str()) {
                return Err(SchemaError::validation(format!(
                    "topic \"{}\" is declared more than once",
                    topic.slug
                )));
            }
        }

        let mut subscriptions = HashSet::new();
        for sub in &self.subscriptions {
            if !is_valid_slug(&sub.slug) {
                return Err(SchemaError::validation(format!(
                    "subscription slug \"{}\" may only contain lowercase letters, numbers or dashes",
                    sub.slug
                )));
            }
            if !subscriptions.insert((sub.topic_slug.as_str(), sub.slug.as_str())) {
                return Err(SchemaError::validation(format!(
                    "subscription \"{}\" is declared more than once on topic \"{}\"",
                    sub.slug, sub.topic_slug
                )));
            }
            match (sub.kind, sub.endpoint.as_deref()) {
                (SubscriptionType::Push, None) => {
                    return Err(SchemaError::validation(format!(
                        "push subscription \"{}\" needs an endpoint",
                        sub.slug
                    )));
                }
                (SubscriptionType::Push, Some(endpoint)) if !is_valid_endpoint(endpoint) => {
                    return Err(SchemaError::validation(format!(
                        "endpoint \"{endpoint}\" of subscription \"{}\" is not an HTTPS URL",
                        sub.slug
                    )));
                }
                (SubscriptionType::Pull, Some(_)) => {
                    return Err(SchemaError::validation(format!(
                        "pull subscription \"{}\" cannot have an endpoint",
                        sub.slug
                    )));
                }
                _ => {}
            }
        }

        Ok(())
    }
}

/// Create request for a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscription {
    pub slug: String,
    pub topic_slug: String,
    pub kind: SubscriptionType,
    pub endpoint: Option<String>,
    pub schema_key: Option<String>,
    pub filter: Option<SubscriptionFilter>,
}

/// A topic as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTopic {
    pub id: String,
    pub slug: String,
}

/// A subscription as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSubscription {
    pub id: String,
    pub topic_id: String,
    pub slug: String,
    #[serde(rename = "type", default)]
    pub kind: SubscriptionType,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub endpoint: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub filter_path: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub filter_value: Option<String>,
}

/// Topics and subscriptions the service holds for one app and key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteState {
    #[serde(default)]
    pub topics: Vec<RemoteTopic>,
    #[serde(default)]
    pub subscriptions: Vec<RemoteSubscription>,
}

impl RemoteState {
    pub fn topic_by_id(&self, id: &str) -> Option<&RemoteTopic> {
        self.topics.iter().find(|t| t.id == id)
    }

    pub fn subscription(&self, slug: &str) -> Option<&RemoteSubscription> {
        self.subscriptions.iter().find(|s| s.slug == slug)
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(key: &str) -> Schema {
        Schema {
            key: key.to_string(),
            topics: vec![Topic {
                slug: "orders".to_string(),
            }],
            subscriptions: vec![Subscription {
                slug: "billing".to_string(),
                topic_slug: "orders".to_string(),
                kind: SubscriptionType::Pull,
                endpoint: None,
                filter: None,
            }],
        }
    }

    fn validation_message(schema: &Schema) -> String {
        match schema.validate() {
            Err(SchemaError::Validation { message }) => message,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_schema() {
        assert!(schema("shop").validate().is_ok());
        assert!(schema("twelve-chars").validate().is_ok());
    }

    #[test]
    fn test_key_length_limit() {
        let msg = validation_message(&schema("thirteen-char"));
        assert!(msg.contains("maximum is 12"), "{msg}");
        let msg = validation_message(&schema(""));
        assert!(msg.contains("must not be empty"));
    }

    #[test]
    fn test_slug_rules() {
        assert!(is_valid_slug("order-events-2"));
        assert!(!is_valid_slug("Orders"));
        assert!(!is_valid_slug("orders_v2"));
        assert!(!is_valid_slug(""));

        let mut s = schema("shop");
        s.topics.push(Topic {
            slug: "orders".to_string(),
        });
        assert!(validation_message(&s).contains("more than once"));
    }

    #[test]
    fn test_subscription_slug_unique_per_topic() {
        let mut s = schema("shop");
        s.topics.push(Topic {
            slug: "refunds".to_string(),
        });
        let mut other = s.subscriptions[0].clone();
        other.topic_slug = "refunds".to_string();
        s.subscriptions.push(other.clone());
        assert!(s.validate().is_ok());

        s.subscriptions.push(other);
        assert!(validation_message(&s).contains("on topic \"refunds\""));
    }

    #[test]
    fn test_push_endpoint_rules() {
        let mut s = schema("shop");
        s.subscriptions[0].kind = SubscriptionType::Push;
        assert!(validation_message(&s).contains("needs an endpoint"));

        s.subscriptions[0].endpoint = Some("http://example.com/hook".to_string());
        assert!(validation_message(&s).contains("not an HTTPS URL"));

        s.subscriptions[0].endpoint = Some("https://example.com/hook".to_string());
        assert!(s.validate().is_ok());

        s.subscriptions[0].kind = SubscriptionType::Pull;
        assert!(validation_message(&s).contains("cannot have an endpoint"));
    }

    #[test]
    fn test_endpoint_check() {
        assert!(is_valid_endpoint("https://example.com/push"));
        assert!(!is_valid_endpoint("https://"));
        assert!(!is_valid_endpoint("ftp://example.com"));
        assert!(!is_valid_endpoint("example.com"));
    }

    #[test]
    fn test_remote_subscription_blank_fields() {
        let sub: RemoteSubscription = serde_json::from_value(serde_json::json!({
            "id": "sub_1",
            "topic_id": "top_1",
            "slug": "billing",
            "type": "pull",
            "endpoint": "",
            "filter_path": null
        }))
        .unwrap();
        assert_eq!(sub.kind, SubscriptionType::Pull);
        assert_eq!(sub.endpoint, None);
        assert_eq!(sub.filter_path, None);
        assert_eq!(sub.filter_value, None);
    }

    #[test]
    fn test_to_new_carries_key() {
        let new = schema("shop").subscriptions[0].to_new("shop");
        assert_eq!(new.schema_key.as_deref(), Some("shop"));
        assert_eq!(new.topic_slug, "orders");
    }
}
