use async_trait::async_trait;
use http::header::USER_AGENT;
use http::HeaderValue;
use reqchain_core::{Next, PipelineRequest, Policy, Response, Result};

/// UserAgentPolicy sets the `User-Agent` header.
///
/// The value is `[<application id> ]reqchain/<version> (<os>; <arch>)[ <suffix>]`.
/// A user agent already present on the request is kept unless `overwrite` is
/// set. A per-call user agent from the request context is appended, or
/// replaces the value entirely when `overwrite` is set.
#[derive(Debug, Clone)]
pub struct UserAgentPolicy {
    user_agent: String,
    overwrite: bool,
}

impl Default for UserAgentPolicy {
    fn default() -> Self {
        Self {
            user_agent: format!(
                "reqchain/{} ({}; {})",
                env!("CARGO_PKG_VERSION"),
                std::env::consts::OS,
                std::env::consts::ARCH
            ),
            overwrite: false,
        }
    }
}

impl UserAgentPolicy {
    /// Create a new policy with the default user agent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix the user agent with an application id.
    pub fn with_application_id(mut self, application_id: &str) -> Self {
        let application_id = application_id.trim();
        if !application_id.is_empty() {
            self.user_agent = format!("{application_id} {}", self.user_agent);
        }
        self
    }

    /// Append a suffix to the user agent.
    pub fn with_suffix(mut self, suffix: &str) -> Self {
        let suffix = suffix.trim();
        if !suffix.is_empty() {
            self.user_agent = format!("{} {suffix}", self.user_agent);
        }
        self
    }

    /// Replace user agents set by the caller instead of keeping them.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// The user agent sent by this policy.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

#[async_trait]
impl Policy for UserAgentPolicy {
    async fn send(&self, req: &mut PipelineRequest, next: Next<'_>) -> Result<Response> {
        let value = match &req.context.user_agent {
            Some(per_call) if self.overwrite => Some(per_call.clone()),
            Some(per_call) => Some(format!("{} {per_call}", self.user_agent)),
            None if self.overwrite || !req.headers().contains_key(USER_AGENT) => {
                Some(self.user_agent.clone())
            }
            None => None,
        };

        if let Some(value) = value {
            req.headers_mut()
                .insert(USER_AGENT, HeaderValue::try_from(value)?);
        }

        next.run(req).await
    }
}
