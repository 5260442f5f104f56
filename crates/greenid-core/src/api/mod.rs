//! REST API client module for the green finance backend.
//!
//! This module provides the `ApiClient` for the authentication and
//! dashboard endpoints, the typed `ApiError`, and the failure policy that
//! turns errors into user-visible `Notice`s.
//!
//! The API uses JWT bearer token authentication obtained from `/auth/login`.

pub mod client;
pub mod error;
pub mod notice;

pub use client::{ApiClient, ApiResult, DEFAULT_BASE_URL, LOGIN_ENDPOINT};
pub use error::ApiError;
pub use notice::Notice;
