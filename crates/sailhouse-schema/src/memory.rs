//! In-process gateway backed by plain collections.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::GatewayError;
use crate::gateway::RemoteGateway;
use crate::model::{NewSubscription, RemoteState, RemoteSubscription, RemoteTopic, SubscriptionType};

/// A mutation received by [`InMemoryGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    CreateTopic { app: String, slug: String },
    DeleteTopic { app: String, slug: String },
    CreateSubscription { app: String, topic_slug: String, slug: String },
    DeleteSubscription { app: String, topic_slug: String, slug: String },
}

#[derive(Debug)]
struct StoredTopic {
    app: String,
    key: Option<String>,
    topic: RemoteTopic,
}

#[derive(Debug)]
struct StoredSubscription {
    app: String,
    key: Option<String>,
    subscription: RemoteSubscription,
}

#[derive(Debug, Default)]
struct Inner {
    topics: Vec<StoredTopic>,
    subscriptions: Vec<StoredSubscription>,
    calls: Vec<GatewayCall>,
    failure: Option<(GatewayCall, GatewayError)>,
}

/// Gateway that keeps remote state in memory.
///
/// This gateway provides:
/// - Key-scoped `fetch_state`
/// - `Conflict` on duplicate creates and `NotFound` on unknown deletes
/// - Cascading topic deletes
/// - A log of every mutation it received, in order
/// - Injected failure for one chosen mutation
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    inner: RwLock<Inner>,
    next_id: AtomicU64,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a topic. `key: None` models a topic owned by no schema.
    pub fn with_topic(mut self, app: &str, key: Option<&str>, slug: &str) -> Self {
        let id = self.next_id("top");
        self.inner.get_mut().topics.push(StoredTopic {
            app: app.to_string(),
            key: key.map(str::to_string),
            topic: RemoteTopic {
                id,
                slug: slug.to_string(),
            },
        });
        self
    }

    /// Seeds a pull subscription under an already seeded topic.
    ///
    /// # Panics
    ///
    /// Panics if the topic has not been seeded.
    pub fn with_subscription(
        mut self,
        app: &str,
        key: Option<&str>,
        topic_slug: &str,
        slug: &str,
    ) -> Self {
        let id = self.next_id("sub");
        let inner = self.inner.get_mut();
        let topic_id = inner
            .topics
            .iter()
            .find(|t| t.app == app && t.topic.slug == topic_slug)
            .map(|t| t.topic.id.clone())
            .unwrap_or_else(|| panic!("topic {topic_slug} must be seeded first"));
        inner.subscriptions.push(StoredSubscription {
            app: app.to_string(),
            key: key.map(str::to_string),
            subscription: RemoteSubscription {
                id,
                topic_id,
                slug: slug.to_string(),
                kind: SubscriptionType::Pull,
                endpoint: None,
                filter_path: None,
                filter_value: None,
            },
        });
        self
    }

    /// Makes `call` fail with `error` instead of being applied.
    pub fn failing_on(mut self, call: GatewayCall, error: GatewayError) -> Self {
        self.inner.get_mut().failure = Some((call, error));
        self
    }

    /// Every mutation received so far, including failed ones.
    pub async fn calls(&self) -> Vec<GatewayCall> {
        self.inner.read().await.calls.clone()
    }

    /// Slugs of every subscription under `topic_slug`, regardless of key.
    pub async fn subscriptions_of(&self, app: &str, topic_slug: &str) -> Vec<String> {
        let inner = self.inner.read().await;
        let Some(topic) = inner
            .topics
            .iter()
            .find(|t| t.app == app && t.topic.slug == topic_slug)
        else {
            return Vec::new();
        };
        inner
            .subscriptions
            .iter()
            .filter(|s| s.app == app && s.subscription.topic_id == topic.topic.id)
            .map(|s| s.subscription.slug.clone())
            .collect()
    }

    fn next_id(&self, prefix: &str) -> String {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{prefix}_{n}")
    }
}

impl Inner {
    fn record(&mut self, call: GatewayCall) -> Result<(), GatewayError> {
        self.calls.push(call.clone());
        match &self.failure {
            Some((failing, error)) if *failing == call => Err(error.clone()),
            _ => Ok(()),
        }
    }

    fn topic(&self, app: &str, slug: &str) -> Option<&StoredTopic> {
        self.topics
            .iter()
            .find(|t| t.app == app && t.topic.slug == slug)
    }
}

#[async_trait]
impl RemoteGateway for InMemoryGateway {
    async fn fetch_state(&self, app: &str, key: &str) -> Result<RemoteState, GatewayError> {
        let inner = self.inner.read().await;
        let owned = |a: &str, k: &Option<String>| a == app && k.as_deref() == Some(key);
        Ok(RemoteState {
            topics: inner
                .topics
                .iter()
                .filter(|t| owned(&t.app, &t.key))
                .map(|t| t.topic.clone())
                .collect(),
            subscriptions: inner
                .subscriptions
                .iter()
                .filter(|s| owned(&s.app, &s.key))
                .map(|s| s.subscription.clone())
                .collect(),
        })
    }

    async fn create_topic(&self, app: &str, slug: &str, key: &str) -> Result<(), GatewayError> {
        let id = self.next_id("top");
        let mut inner = self.inner.write().await;
        inner.record(GatewayCall::CreateTopic {
            app: app.to_string(),
            slug: slug.to_string(),
        })?;
        if inner.topic(app, slug).is_some() {
            return Err(GatewayError::conflict(format!("topic {slug}")));
        }
        inner.topics.push(StoredTopic {
            app: app.to_string(),
            key: Some(key.to_string()),
            topic: RemoteTopic {
                id,
                slug: slug.to_string(),
            },
        });
        Ok(())
    }

    async fn delete_topic(&self, app: &str, slug: &str) -> Result<(), GatewayError> {
        let mut inner = self.inner.write().await;
        inner.record(GatewayCall::DeleteTopic {
            app: app.to_string(),
            slug: slug.to_string(),
        })?;
        let id = inner
            .topic(app, slug)
            .map(|t| t.topic.id.clone())
            .ok_or_else(|| GatewayError::not_found(format!("topic {slug}")))?;
        inner.topics.retain(|t| t.topic.id != id);
        inner
            .subscriptions
            .retain(|s| s.subscription.topic_id != id);
        Ok(())
    }

    async fn create_subscription(
        &self,
        app: &str,
        subscription: &NewSubscription,
    ) -> Result<(), GatewayError> {
        let id = self.next_id("sub");
        let mut inner = self.inner.write().await;
        inner.record(GatewayCall::CreateSubscription {
            app: app.to_string(),
            topic_slug: subscription.topic_slug.clone(),
            slug: subscription.slug.clone(),
        })?;
        let topic_id = inner
            .topic(app, &subscription.topic_slug)
            .map(|t| t.topic.id.clone())
            .ok_or_else(|| {
                GatewayError::not_found(format!("topic {}", subscription.topic_slug))
            })?;
        if inner.subscriptions.iter().any(|s| {
            s.subscription.topic_id == topic_id && s.subscription.slug == subscription.slug
        }) {
            return Err(GatewayError::conflict(format!(
                "subscription {}",
                subscription.slug
            )));
        }
        let (filter_path, filter_value) = match &subscription.filter {
            Some(f) => (Some(f.path.clone()), Some(f.value.clone())),
            None => (None, None),
        };
        inner.subscriptions.push(StoredSubscription {
            app: app.to_string(),
            key: subscription.schema_key.clone(),
            subscription: RemoteSubscription {
                id,
                topic_id,
                slug: subscription.slug.clone(),
                kind: subscription.kind,
                endpoint: subscription.endpoint.clone(),
                filter_path,
                filter_value,
            },
        });
        Ok(())
    }

    async fn delete_subscription(
        &self,
        app: &str,
        topic_slug: &str,
        slug: &str,
    ) -> Result<(), GatewayError> {
        let mut inner = self.inner.write().await;
        inner.record(GatewayCall::DeleteSubscription {
            app: app.to_string(),
            topic_slug: topic_slug.to_string(),
            slug: slug.to_string(),
        })?;
        let topic_id = inner
            .topic(app, topic_slug)
            .map(|t| t.topic.id.clone())
            .ok_or_else(|| GatewayError::not_found(format!("topic {topic_slug}")))?;
        let before = inner.subscriptions.len();
        inner
            .subscriptions
            .retain(|s| !(s.subscription.topic_id == topic_id && s.subscription.slug == slug));
        if inner.subscriptions.len() == before {
            return Err(GatewayError::not_found(format!("subscription {slug}")));
        }
        Ok(())
    }
}
