//! Credential-aware HTTP request pipelines.
//!
//! reqchain wraps every outgoing request in a chain of policies: bearer token
//! authorization with caching and claims challenges, redirects that never leak
//! credentials to another origin, user agent, extra headers and logging.
//!
//! ## Quick Start
//!
//! ```no_run
//! use reqchain::auth::StaticTokenProvider;
//! use reqchain::{default_context, Config, PipelineBuilder, Token};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> reqchain::Result<()> {
//!     let ctx = default_context();
//!     let config = Config::default().from_env(&ctx)?;
//!     let credential =
//!         StaticTokenProvider::new(Token::expires_in("token", Duration::from_secs(3600)));
//!
//!     let pipeline = PipelineBuilder::new(ctx)
//!         .with_config(config.clone())
//!         .with_bearer_token(credential, ["https://storage.example.com/.default"])
//!         .build();
//!
//!     let req = http::Request::get("https://storage.example.com/container")
//!         .body(bytes::Bytes::new())
//!         .unwrap();
//!     let resp = pipeline.run_with_context(req, config.request_context()).await?;
//!     println!("{}", resp.status());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `default-context`: [`default_context`] backed by reqwest and the OS environment
//! - `auth`: bearer token, API key and SAS policies
//! - `redirect`: redirect following and credential cleanup
//! - `http-policies`: headers, user agent and logging policies
//! - `blocking`: `Pipeline::run_blocking`

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub use reqchain_core::*;

mod config;
pub use config::*;

#[cfg(feature = "default-context")]
mod context;
#[cfg(feature = "default-context")]
pub use context::default_context;

#[cfg(all(feature = "auth", feature = "redirect", feature = "http-policies"))]
mod builder;
#[cfg(all(feature = "auth", feature = "redirect", feature = "http-policies"))]
pub use builder::PipelineBuilder;

#[cfg(feature = "auth")]
pub mod auth {
    //! Authentication policies and token providers.
    pub use reqchain_auth::*;
}

#[cfg(feature = "redirect")]
pub mod redirect {
    //! Redirect handling.
    pub use reqchain_redirect::*;
}

#[cfg(feature = "http-policies")]
pub mod policies {
    //! Headers, user agent and logging policies.
    pub use reqchain_http_policies::*;
}
