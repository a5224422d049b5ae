pub mod apps;
pub mod auth;
pub mod config;
pub mod schema;
pub mod subscriptions;
pub mod teams;
pub mod tokens;
pub mod topics;
