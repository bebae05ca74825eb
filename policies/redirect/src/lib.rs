//! Redirect handling for reqchain pipelines.
//!
//! [`RedirectPolicy`] follows redirects inside the pipeline, and
//! [`SensitiveHeaderCleanupPolicy`] removes credentials from requests that were
//! redirected to another origin. Place the cleanup policy after every policy
//! adding credentials:
//!
//! ```no_run
//! use reqchain_redirect::{RedirectPolicy, SensitiveHeaderCleanupPolicy};
//! use reqchain_core::{Context, Pipeline};
//!
//! # fn example(ctx: Context) {
//! let pipeline = Pipeline::new(ctx)
//!     .push(RedirectPolicy::default())
//!     // credential policies go here
//!     .push(SensitiveHeaderCleanupPolicy::default());
//! # }
//! ```

#![warn(missing_docs)]

mod redirect;
pub use redirect::{RedirectPolicy, DEFAULT_MAX_REDIRECTS};

mod cleanup;
pub use cleanup::SensitiveHeaderCleanupPolicy;
