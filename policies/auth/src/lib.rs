//! Authentication policies for reqchain pipelines.
//!
//! - [`BearerTokenPolicy`]: `Authorization: Bearer <token>` from a [`ProvideToken`](reqchain_core::ProvideToken),
//!   with caching, proactive refresh and claims challenges.
//! - [`KeyCredentialPolicy`]: an API key in a named header.
//! - [`SasCredentialPolicy`]: a shared access signature in the query.
//!
//! ## Example
//!
//! ```no_run
//! use reqchain_auth::{BearerTokenPolicy, StaticTokenProvider};
//! use reqchain_core::{Context, Pipeline, Token};
//! use std::time::Duration;
//!
//! # async fn example(ctx: Context) -> reqchain_core::Result<()> {
//! let credential = StaticTokenProvider::new(Token::expires_in("token", Duration::from_secs(3600)));
//! let pipeline = Pipeline::new(ctx)
//!     .push(BearerTokenPolicy::new(credential, ["https://storage.example.com/.default"]));
//!
//! let req = http::Request::get("https://storage.example.com/container")
//!     .body(bytes::Bytes::new())
//!     .unwrap();
//! let resp = pipeline.run(req).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod bearer;
pub use bearer::{AuthorizationHooks, BearerTokenPolicy, DefaultAuthorization};

pub mod challenge;

mod key;
pub use key::{KeyCredential, KeyCredentialPolicy};

mod sas;
pub use sas::{SasCredential, SasCredentialPolicy};

mod provide_token;
pub use provide_token::{ProvideTokenChain, StaticTokenProvider};
