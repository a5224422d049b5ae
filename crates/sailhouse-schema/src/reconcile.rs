//! The `reconcile` entry point: load, fetch, diff, filter, apply.

use std::path::Path;

use serde::Serialize;

use crate::apply::{ApplyConsole, ApplyOptions, ApplyOutcome, Executor};
use crate::diff::{Change, diff};
use crate::error::{ReconcileError, SchemaError};
use crate::filter::filter_dependents;
use crate::gateway::RemoteGateway;
use crate::loader::SchemaLoader;
use crate::model::{RemoteState, Schema};

/// Explicit context of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileContext {
    pub app: String,
}

impl ReconcileContext {
    pub fn new(app: impl Into<String>) -> Self {
        Self { app: app.into() }
    }
}

/// Result of one reconciliation run.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub key: String,
    pub changes: Vec<Change>,
    /// `changes` rendered as `<type> <slug> <KIND>`.
    pub lines: Vec<String>,
    pub outcome: ApplyOutcome,
}

impl RunResult {
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }
}

/// Computes the filtered change list for `desired` against `remote`.
pub fn plan(desired: &Schema, remote: &RemoteState) -> Vec<Change> {
    filter_dependents(diff(desired, remote))
}

pub struct Reconciler<'a> {
    loader: &'a dyn SchemaLoader,
    gateway: &'a dyn RemoteGateway,
}

impl<'a> Reconciler<'a> {
    pub fn new(loader: &'a dyn SchemaLoader, gateway: &'a dyn RemoteGateway) -> Self {
        Self { loader, gateway }
    }

    /// Converges the remote state of `ctx.app` to the schema at `schema_path`.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError` if the schema cannot be loaded or the remote
    /// state cannot be fetched. Nothing has been changed remotely in that
    /// case. Failures while applying are reported through
    /// [`ApplyOutcome::Failed`] instead.
    pub async fn reconcile(
        &self,
        schema_path: &Path,
        ctx: &ReconcileContext,
        options: ApplyOptions,
        console: &mut dyn ApplyConsole,
    ) -> Result<RunResult, ReconcileError> {
        let desired = self.loader.load(schema_path)?;
        let remote = self.gateway.fetch_state(&ctx.app, &desired.key).await?;
        check_topic_references(&desired, &remote)?;

        let changes = plan(&desired, &remote);
        tracing::debug!(
            app = %ctx.app,
            key = %desired.key,
            changes = changes.len(),
            dry_run = options.dry_run,
            "planned schema changes"
        );

        let outcome = Executor::new(self.gateway, &ctx.app)
            .apply(&desired, &remote, &changes, options, console)
            .await;

        Ok(RunResult {
            key: desired.key,
            lines: changes.iter().map(ToString::to_string).collect(),
            changes,
            outcome,
        })
    }
}

/// Every subscription must point at a desired topic or an existing one.
fn check_topic_references(desired: &Schema, remote: &RemoteState) -> Result<(), SchemaError> {
    for sub in &desired.subscriptions {
        let known = desired.topic(&sub.topic_slug).is_some()
            || remote.topics.iter().any(|t| t.slug == sub.topic_slug);
        if !known {
            return Err(SchemaError::validation(format!(
                "subscription \"{}\" references unknown topic \"{}\"",
                sub.slug, sub.topic_slug
            )));
        }
    }
    Ok(())
}
