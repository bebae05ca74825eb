//! Core components for credential-aware HTTP request pipelines.
//!
//! This crate provides the foundational types and traits for the reqchain ecosystem.
//! It defines the abstractions every policy is built on, and the executor that
//! drives them.
//!
//! ## Overview
//!
//! The crate is built around several key concepts:
//!
//! - **Context**: A container that holds implementations for HTTP sending and environment access
//! - **Traits**: Abstract interfaces for token acquisition (`ProvideToken`) and chain steps (`Policy`, `SansIoPolicy`)
//! - **Pipeline**: The executor that threads a request through its policies and the transport
//!
//! ## Example
//!
//! ```no_run
//! use async_trait::async_trait;
//! use reqchain_core::{Context, Next, Pipeline, PipelineRequest, Policy, Response, Result};
//!
//! // Define your policy
//! #[derive(Debug)]
//! struct RequestIdPolicy;
//!
//! #[async_trait]
//! impl Policy for RequestIdPolicy {
//!     async fn send(&self, req: &mut PipelineRequest, next: Next<'_>) -> Result<Response> {
//!         req.headers_mut()
//!             .insert("x-request-id", http::HeaderValue::from_static("42"));
//!         next.run(req).await
//!     }
//! }
//!
//! # async fn example() -> Result<()> {
//! // Create a context with your transport
//! let ctx = Context::default();
//!
//! // Create a pipeline
//! let pipeline = Pipeline::new(ctx).push(RequestIdPolicy);
//!
//! // Run your requests
//! let req = http::Request::get("https://example.com")
//!     .body(bytes::Bytes::new())
//!     .unwrap();
//! let resp = pipeline.run(req).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Traits
//!
//! This crate defines several important traits:
//!
//! - [`HttpSend`]: For sending HTTP requests
//! - [`Env`]: For environment variable access
//! - [`ProvideToken`]: For obtaining bearer tokens
//! - [`Policy`]: For steps that control the rest of the chain
//! - [`SansIoPolicy`]: For steps that only observe requests and responses
//!
//! ## Utilities
//!
//! The crate also provides utility modules:
//!
//! - [`hash`]: Base64 helpers
//! - [`time`]: Time manipulation utilities
//! - [`utils`]: General utilities including data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod context;
pub use context::{Context, Env, HttpSend, NoopEnv, NoopHttpSend, OsEnv, StaticEnv};

mod error;
pub use error::{Error, ErrorKind, Result};

mod token;
pub use token::{Token, TokenRequestOptions, REFRESH_SKEW};

mod request;
pub use request::{Origin, PipelineRequest, RequestContext, Response};

mod api;
pub use api::{Policy, ProvideToken, SansIoPolicy};

mod pipeline;
pub use pipeline::{Next, Pipeline, SansIo};
