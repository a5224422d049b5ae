//! Remote-state gateway trait.

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::model::{NewSubscription, RemoteState};

/// Access to the topics and subscriptions the service holds for an app.
///
/// Implementations must be thread-safe (`Send + Sync`).
///
/// # Example
///
/// ```ignore
/// use sailhouse_schema::{GatewayError, RemoteGateway};
///
/// async fn topic_count(gateway: &dyn RemoteGateway, app: &str, key: &str) -> Result<usize, GatewayError> {
///     Ok(gateway.fetch_state(app, key).await?.topics.len())
/// }
/// ```
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// Fetches the topics and subscriptions tagged with `key`.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::NotFound` if the app does not exist.
    async fn fetch_state(&self, app: &str, key: &str) -> Result<RemoteState, GatewayError>;

    /// Creates a topic tagged with `key`.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Conflict` if the topic already exists.
    async fn create_topic(&self, app: &str, slug: &str, key: &str) -> Result<(), GatewayError>;

    /// Deletes a topic together with its subscriptions.
    async fn delete_topic(&self, app: &str, slug: &str) -> Result<(), GatewayError>;

    /// Creates a subscription on an existing topic.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Conflict` if the subscription already exists.
    async fn create_subscription(
        &self,
        app: &str,
        subscription: &NewSubscription,
    ) -> Result<(), GatewayError>;

    async fn delete_subscription(
        &self,
        app: &str,
        topic_slug: &str,
        slug: &str,
    ) -> Result<(), GatewayError>;
}
