// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Statline Fetch
//!
//! Resilient upstream access for Statline sources.
//!
//! ## Requests
//!
//! - [`client::FetchClient`] - One REST request/response cycle per call
//! - [`graphql::GraphQlClient`] - GraphQL queries with envelope error checks
//!
//! ## Failures
//!
//! - [`error::PipelineError`] - Closed taxonomy of fetch failures
//! - [`classify`] - Critical vs recoverable severity
//! - [`retry`] - Transient backoff and rate-limit waits
//! - [`context::FetchContext`] - Runs calls under both retry loops
//! - [`result::FetchResult`] - Payload with record count and duration
//!
//! ## Example
//!
//! ```ignore
//! use statline_fetch::{FetchClient, FetchContext, RequestOptions};
//!
//! let ctx = FetchContext::new();
//! let client = FetchClient::builder("https://api.example.com/v1").build()?;
//!
//! let options = RequestOptions::new().query("season", 2024);
//! let teams: Vec<serde_json::Value> = ctx
//!     .call(|| client.get("teams", &options))
//!     .await?;
//! ```

pub mod classify;
pub mod client;
pub mod context;
pub mod error;
pub mod graphql;
pub mod result;
pub mod retry;

// Re-export key types at crate root

pub use classify::{Severity, classify, is_critical};
pub use client::{FetchClient, FetchClientBuilder, RequestOptions, parse_retry_after};
pub use context::{FetchContext, FetchSettings};
pub use error::{ClientError, HttpErrorKind, PipelineError};
pub use graphql::GraphQlClient;
pub use result::FetchResult;
pub use retry::{RateLimitPolicy, RetryPolicy, with_retries};
