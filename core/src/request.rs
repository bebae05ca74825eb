use bytes::Bytes;
use http::uri::Scheme;
use http::{Extensions, HeaderMap, Method, Uri};
use std::time::Duration;

/// Response returned by a pipeline.
pub type Response = http::Response<Bytes>;

/// Per-call options visible to every policy processing a request.
///
/// A fresh context is created for every [`Pipeline::run`](crate::Pipeline::run)
/// call and dropped when it returns. Policies that resend (challenge retry,
/// redirects) carry the same context forward.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Whether credentials may only travel over https.
    ///
    /// `None` means the default, which is enforced.
    pub enforce_https: Option<bool>,
    /// Deadline for the whole call, including redirects and challenge retries.
    pub timeout: Option<Duration>,
    /// Extra headers to add to this call only.
    pub headers: HeaderMap,
    /// User agent to use for this call only.
    pub user_agent: Option<String>,
    /// Urls visited by redirects, oldest first.
    pub redirects: Vec<Uri>,
    /// Options for custom policies.
    pub extensions: Extensions,
    cross_origin_redirect: bool,
}

impl RequestContext {
    /// Opt in or out of https enforcement for this call.
    pub fn with_enforce_https(mut self, enforce_https: bool) -> Self {
        self.enforce_https = Some(enforce_https);
        self
    }

    /// Set the deadline for this call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent for this call.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Add a header for this call.
    pub fn with_header(mut self, name: http::HeaderName, value: http::HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Whether https is enforced for this call.
    pub fn enforce_https(&self) -> bool {
        self.enforce_https.unwrap_or(true)
    }

    /// Record that the request has been redirected to another origin.
    pub fn mark_cross_origin_redirect(&mut self) {
        self.cross_origin_redirect = true;
    }

    /// Check whether the request has been redirected to another origin.
    pub fn is_cross_origin_redirect(&self) -> bool {
        self.cross_origin_redirect
    }

    /// Consume the cross origin redirect marker.
    pub fn take_cross_origin_redirect(&mut self) -> bool {
        std::mem::take(&mut self.cross_origin_redirect)
    }
}

/// PipelineRequest pairs an http request with its per-call context.
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    /// The request that will be sent.
    pub request: http::Request<Bytes>,
    /// Per-call options.
    pub context: RequestContext,
}

impl PipelineRequest {
    /// Create a new pipeline request with a default context.
    pub fn new(request: http::Request<Bytes>) -> Self {
        Self::with_context(request, RequestContext::default())
    }

    /// Create a new pipeline request with the given context.
    pub fn with_context(request: http::Request<Bytes>, context: RequestContext) -> Self {
        Self { request, context }
    }

    /// HTTP method.
    #[inline]
    pub fn method(&self) -> &Method {
        self.request.method()
    }

    /// HTTP uri.
    #[inline]
    pub fn uri(&self) -> &Uri {
        self.request.uri()
    }

    /// HTTP headers.
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        self.request.headers()
    }

    /// Mutable HTTP headers.
    #[inline]
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        self.request.headers_mut()
    }

    /// Check if the request targets an https url.
    pub fn is_https(&self) -> bool {
        self.uri().scheme() == Some(&Scheme::HTTPS)
    }
}

/// Origin is the (scheme, host, port) triple of an url.
///
/// Default ports are made explicit, so `https://example.com` and
/// `https://example.com:443` share the same origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    scheme: String,
    host: String,
    port: Option<u16>,
}

impl Origin {
    /// Get the origin of an absolute uri, `None` for relative ones.
    pub fn of(uri: &Uri) -> Option<Self> {
        let scheme = uri.scheme_str()?.to_ascii_lowercase();
        let host = uri.host()?.to_ascii_lowercase();
        let port = uri.port_u16().or(match scheme.as_str() {
            "http" => Some(80),
            "https" => Some(443),
            _ => None,
        });

        Some(Self { scheme, host, port })
    }
}
