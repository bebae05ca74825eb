use async_trait::async_trait;
use http::header::AUTHORIZATION;
use http::HeaderName;
use log::debug;
use reqchain_core::{Next, PipelineRequest, Policy, Response, Result};

/// SensitiveHeaderCleanupPolicy removes credentials from requests redirected
/// to another origin.
///
/// Blocked by default: `Authorization` and `x-ms-authorization-auxiliary`.
#[derive(Debug, Clone)]
pub struct SensitiveHeaderCleanupPolicy {
    blocked: Vec<HeaderName>,
    disable_redirect_cleanup: bool,
}

impl Default for SensitiveHeaderCleanupPolicy {
    fn default() -> Self {
        Self {
            blocked: vec![
                AUTHORIZATION,
                HeaderName::from_static("x-ms-authorization-auxiliary"),
            ],
            disable_redirect_cleanup: false,
        }
    }
}

impl SensitiveHeaderCleanupPolicy {
    /// Create a new policy blocking the default headers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the set of blocked headers.
    pub fn with_blocked_headers(mut self, headers: impl IntoIterator<Item = HeaderName>) -> Self {
        self.blocked = headers.into_iter().collect();
        self
    }

    /// Keep every header, even across origins.
    pub fn with_disable_redirect_cleanup(mut self, disable: bool) -> Self {
        self.disable_redirect_cleanup = disable;
        self
    }
}

#[async_trait]
impl Policy for SensitiveHeaderCleanupPolicy {
    async fn send(&self, req: &mut PipelineRequest, next: Next<'_>) -> Result<Response> {
        if !self.disable_redirect_cleanup && req.context.is_cross_origin_redirect() {
            for name in &self.blocked {
                if req.headers_mut().remove(name).is_some() {
                    debug!("removed {name} from request redirected to another origin");
                }
            }
        }

        next.run(req).await
    }
}
