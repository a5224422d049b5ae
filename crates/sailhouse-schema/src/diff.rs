//! Change computation between desired and remote state.

use std::fmt;

use serde::Serialize;

use crate::model::{RemoteState, RemoteSubscription, RemoteTopic, Schema, Subscription, Topic};

/// Kind of object a change targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EntityType {
    Topic,
    Subscription,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Topic => write!(f, "Topic"),
            Self::Subscription => write!(f, "Subscription"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChangeKind {
    Create,
    Delete,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "CREATE"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// One create or delete needed to move remote state toward desired state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub entity: EntityType,
    pub slug: String,
    /// Owning topic of a subscription delete, when it could be resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_slug: Option<String>,
    pub kind: ChangeKind,
}

impl Change {
    pub fn create(entity: EntityType, slug: impl Into<String>) -> Self {
        Self {
            entity,
            slug: slug.into(),
            parent_slug: None,
            kind: ChangeKind::Create,
        }
    }

    pub fn delete(entity: EntityType, slug: impl Into<String>) -> Self {
        Self {
            entity,
            slug: slug.into(),
            parent_slug: None,
            kind: ChangeKind::Delete,
        }
    }

    pub fn with_parent(mut self, parent_slug: Option<String>) -> Self {
        self.parent_slug = parent_slug;
        self
    }

    pub fn is_delete(&self) -> bool {
        self.kind == ChangeKind::Delete
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.entity, self.slug, self.kind)
    }
}

/// Decides whether a desired object and a remote object are the same.
pub trait Matcher {
    fn topic_matches(&self, desired: &Topic, remote: &RemoteTopic) -> bool;
    fn subscription_matches(&self, desired: &Subscription, remote: &RemoteSubscription) -> bool;
}

/// Matches by slug alone. Subscriptions match regardless of their topic.
#[derive(Debug, Default, Clone, Copy)]
pub struct SlugMatcher;

impl Matcher for SlugMatcher {
    fn topic_matches(&self, desired: &Topic, remote: &RemoteTopic) -> bool {
        desired.slug == remote.slug
    }

    fn subscription_matches(&self, desired: &Subscription, remote: &RemoteSubscription) -> bool {
        desired.slug == remote.slug
    }
}

/// Computes changes using [`SlugMatcher`].
pub fn diff(desired: &Schema, remote: &RemoteState) -> Vec<Change> {
    diff_with(desired, remote, &SlugMatcher)
}

/// Computes the changes that converge `remote` to `desired`.
///
/// Output order is topic creates, topic deletes, subscription creates, then
/// subscription deletes. Callers apply changes in this order.
pub fn diff_with(desired: &Schema, remote: &RemoteState, matcher: &dyn Matcher) -> Vec<Change> {
    let mut changes = Vec::new();

    for topic in &desired.topics {
        if !remote.topics.iter().any(|r| matcher.topic_matches(topic, r)) {
            changes.push(Change::create(EntityType::Topic, &topic.slug));
        }
    }

    for existing in &remote.topics {
        if !desired.topics.iter().any(|t| matcher.topic_matches(t, existing)) {
            changes.push(Change::delete(EntityType::Topic, &existing.slug));
        }
    }

    for sub in &desired.subscriptions {
        if !remote
            .subscriptions
            .iter()
            .any(|r| matcher.subscription_matches(sub, r))
        {
            changes.push(Change::create(EntityType::Subscription, &sub.slug));
        }
    }

    for existing in &remote.subscriptions {
        if !desired
            .subscriptions
            .iter()
            .any(|s| matcher.subscription_matches(s, existing))
        {
            let parent = remote
                .topic_by_id(&existing.topic_id)
                .map(|t| t.slug.clone());
            changes.push(
                Change::delete(EntityType::Subscription, &existing.slug).with_parent(parent),
            );
        }
    }

    tracing::debug!(key = %desired.key, changes = changes.len(), "computed schema diff");
    changes
}
