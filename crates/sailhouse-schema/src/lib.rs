//! # sailhouse-schema
//!
//! Declarative reconciliation of Sailhouse topics and subscriptions.
//!
//! A schema document describes the topics and subscriptions an app should
//! have under one reconciliation key. [`Reconciler::reconcile`] loads the
//! document, fetches what the service currently holds for that key, computes
//! the creates and deletes needed to converge, and applies them in order.
//!
//! ## Overview
//!
//! - [`diff`] compares desired and remote state by slug
//! - [`filter_dependents`] drops subscription deletes made redundant by a topic delete
//! - [`Executor`] applies the remaining changes, stopping at the first error
//!
//! The service and the operator are reached through two seams:
//! [`RemoteGateway`] for the remote API and [`ApplyConsole`] for plan display
//! and confirmation. [`SchemaLoader`] supplies desired state.
//!
//! ## Example
//!
//! ```ignore
//! use sailhouse_schema::{ApplyOptions, ReconcileContext, Reconciler, YamlSchemaLoader};
//!
//! async fn dry_run(gateway: &dyn RemoteGateway, console: &mut dyn ApplyConsole) {
//!     let reconciler = Reconciler::new(&YamlSchemaLoader, gateway);
//!     let options = ApplyOptions { dry_run: true, auto_confirm: false };
//!     let result = reconciler
//!         .reconcile("sailhouse.yaml".as_ref(), &ReconcileContext::new("my-app"), options, console)
//!         .await?;
//!     for line in &result.lines {
//!         println!("{line}");
//!     }
//! }
//! ```

pub mod apply;
pub mod diff;
pub mod error;
pub mod filter;
pub mod gateway;
pub mod loader;
pub mod memory;
pub mod model;
pub mod reconcile;
pub mod template;

pub use apply::{ApplyConsole, ApplyOptions, ApplyOutcome, CONFIRM_PROMPT, Executor};
pub use diff::{Change, ChangeKind, EntityType, Matcher, SlugMatcher, diff, diff_with};
pub use error::{ErrorCategory, GatewayError, ReconcileError, SchemaError};
pub use filter::filter_dependents;
pub use gateway::RemoteGateway;
pub use loader::{DEFAULT_SCHEMA_NAME, SchemaLoader, YamlSchemaLoader, parse_schema, schema_path};
pub use memory::{GatewayCall, InMemoryGateway};
pub use model::{
    MAX_KEY_LEN, NewSubscription, RemoteState, RemoteSubscription, RemoteTopic, Schema,
    Subscription, SubscriptionFilter, SubscriptionType, Topic, is_valid_endpoint, is_valid_slug,
};
pub use reconcile::{ReconcileContext, Reconciler, RunResult, plan};
pub use template::{DEFAULT_KEY, starter_schema};
