//! Core library for greenid.
//!
//! This crate contains the client-side state of the green finance
//! identification admin system, independent of any particular frontend:
//! - `auth`: session store, inactivity timer, persisted storage backends
//! - `activity`: registration of qualifying user-input events
//! - `tabs`: the multi-page tab registry
//! - `routes`: the route table and navigation guard
//! - `listing`: the read-only list pages and their endpoints
//! - `api`: REST client for the backend and its failure policy
//! - `config`: application configuration

pub mod activity;
pub mod api;
pub mod auth;
pub mod config;
pub mod listing;
pub mod models;
pub mod routes;
pub mod tabs;

pub use activity::{Activity, ActivityRegistration};
pub use api::{ApiClient, ApiError, Notice};
pub use auth::{Identity, PermissionSet, SessionState, SessionStore};
pub use config::Config;
pub use listing::{ListTable, ListView};
pub use routes::{guard, Navigation, Route};
pub use tabs::{RouteDescriptor, Tab, TabRegistry};
