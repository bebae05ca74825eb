use async_trait::async_trait;
use http::{HeaderMap, HeaderName, HeaderValue};
use reqchain_core::{Next, PipelineRequest, Policy, Response, Result};

/// HeadersPolicy adds headers to every request.
///
/// Headers configured on the policy are applied first, then the headers of
/// the request context, so per-call values win.
#[derive(Debug, Clone, Default)]
pub struct HeadersPolicy {
    headers: HeaderMap,
}

impl HeadersPolicy {
    /// Create a new policy without headers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header sent with every request.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Add all the headers of `headers`.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }
}

#[async_trait]
impl Policy for HeadersPolicy {
    async fn send(&self, req: &mut PipelineRequest, next: Next<'_>) -> Result<Response> {
        for (name, value) in &self.headers {
            req.headers_mut().insert(name, value.clone());
        }

        let per_call = req.context.headers.clone();
        for (name, value) in &per_call {
            req.headers_mut().insert(name, value.clone());
        }

        next.run(req).await
    }
}
