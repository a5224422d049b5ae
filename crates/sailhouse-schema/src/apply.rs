//! Apply executor: runs filtered changes against a [`RemoteGateway`].

use serde::Serialize;

use crate::diff::{Change, ChangeKind, EntityType};
use crate::error::GatewayError;
use crate::gateway::RemoteGateway;
use crate::model::{RemoteState, Schema};

/// Prompt shown before changes are applied.
pub const CONFIRM_PROMPT: &str = "Apply changes?";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOptions {
    /// Show the plan and stop.
    pub dry_run: bool,
    /// Skip the confirmation prompt.
    pub auto_confirm: bool,
}

/// Interactive side of an apply run.
pub trait ApplyConsole: Send {
    /// Called once with the full plan, before any action is taken.
    fn show_plan(&mut self, changes: &[Change]);

    fn show_no_changes(&mut self);

    /// Asks the operator to go ahead. Returning false aborts without error.
    fn confirm(&mut self, prompt: &str) -> bool;

    /// Called right before step `step` (1-based) of `total` is sent.
    fn applying(&mut self, step: usize, total: usize, change: &Change);
}

/// How an apply run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ApplyOutcome {
    NoChanges,
    DryRun,
    Declined,
    Applied {
        count: usize,
    },
    /// Stopped at `change` after `completed` earlier changes succeeded.
    /// Applied changes are not rolled back.
    Failed {
        completed: usize,
        change: Change,
        #[serde(serialize_with = "serialize_error")]
        error: GatewayError,
    },
}

impl ApplyOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }
}

fn serialize_error<S: serde::Serializer>(error: &GatewayError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(error)
}

/// Runs changes in order against one app, stopping at the first error.
pub struct Executor<'a> {
    gateway: &'a dyn RemoteGateway,
    app: &'a str,
}

impl<'a> Executor<'a> {
    pub fn new(gateway: &'a dyn RemoteGateway, app: &'a str) -> Self {
        Self { gateway, app }
    }

    /// Applies `changes` computed from `desired` and `remote`.
    ///
    /// `desired` supplies the fields of subscription creates; `remote` is the
    /// snapshot the changes were computed from and is not refreshed.
    pub async fn apply(
        &self,
        desired: &Schema,
        remote: &RemoteState,
        changes: &[Change],
        options: ApplyOptions,
        console: &mut dyn ApplyConsole,
    ) -> ApplyOutcome {
        if changes.is_empty() {
            console.show_no_changes();
            return ApplyOutcome::NoChanges;
        }

        console.show_plan(changes);

        if options.dry_run {
            return ApplyOutcome::DryRun;
        }

        if !options.auto_confirm && !console.confirm(CONFIRM_PROMPT) {
            tracing::info!("apply declined");
            return ApplyOutcome::Declined;
        }

        let total = changes.len();
        for (index, change) in changes.iter().enumerate() {
            console.applying(index + 1, total, change);
            tracing::info!(
                app = self.app,
                entity = %change.entity,
                kind = %change.kind,
                slug = %change.slug,
                "applying change"
            );
            if let Err(error) = self.apply_one(desired, remote, change).await {
                tracing::warn!(
                    completed = index,
                    change = %change,
                    category = %error.category(),
                    "apply aborted: {error}"
                );
                return ApplyOutcome::Failed {
                    completed: index,
                    change: change.clone(),
                    error,
                };
            }
        }

        ApplyOutcome::Applied { count: total }
    }

    /// A subscription delete without a resolved owning topic fails with
    /// `NotFound` here and is never sent to the gateway.
    async fn apply_one(
        &self,
        desired: &Schema,
        remote: &RemoteState,
        change: &Change,
    ) -> Result<(), GatewayError> {
        match (change.kind, change.entity) {
            (ChangeKind::Create, EntityType::Topic) => {
                self.gateway
                    .create_topic(self.app, &change.slug, &desired.key)
                    .await
            }
            (ChangeKind::Create, EntityType::Subscription) => {
                let sub = desired.subscription(&change.slug).ok_or_else(|| {
                    GatewayError::not_found(format!("subscription {} in schema", change.slug))
                })?;
                self.gateway
                    .create_subscription(self.app, &sub.to_new(&desired.key))
                    .await
            }
            (ChangeKind::Delete, EntityType::Topic) => {
                self.gateway.delete_topic(self.app, &change.slug).await
            }
            (ChangeKind::Delete, EntityType::Subscription) => {
                let existing = remote.subscription(&change.slug).ok_or_else(|| {
                    GatewayError::not_found(format!("subscription {}", change.slug))
                })?;
                let topic_slug = change.parent_slug.as_deref().ok_or_else(|| {
                    GatewayError::not_found(format!(
                        "owning topic {} of subscription {}",
                        existing.topic_id, existing.slug
                    ))
                })?;
                self.gateway
                    .delete_subscription(self.app, topic_slug, &existing.slug)
                    .await
            }
        }
    }
}
