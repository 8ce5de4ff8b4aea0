//! # sso-api
//!
//! HTTP API layer for Pragma SSO built on Axum.
//!
//! Provides the REST endpoints, the authenticated-user extractor (cookie or
//! bearer token), request validation, CORS, and the mapping from
//! [`AppError`](sso_core::AppError) kinds to HTTP statuses.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, serve};
pub use state::AppState;
