use async_trait::async_trait;
use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, LOCATION, TRANSFER_ENCODING};
use http::{HeaderName, Method, StatusCode, Uri};
use log::debug;
use reqchain_core::{Error, Next, Origin, PipelineRequest, Policy, Response, Result};
use url::Url;

/// Redirects followed per call unless configured otherwise.
pub const DEFAULT_MAX_REDIRECTS: usize = 30;

/// RedirectPolicy follows redirect responses.
///
/// Each redirect re-runs the policies after this one with the follow-up
/// request, so they can re-authorize or scrub it. Once the target leaves the
/// origin of the original request, the request context is marked so that
/// [`SensitiveHeaderCleanupPolicy`](crate::SensitiveHeaderCleanupPolicy) can
/// drop credentials.
///
/// Follow-up requests switch to `GET` without body after `301`, `302` and
/// `303`, unless the method was `GET` or `HEAD`. `307` and `308` keep method
/// and body.
#[derive(Debug, Clone)]
pub struct RedirectPolicy {
    permit_redirects: bool,
    max_redirects: usize,
    statuses: Vec<StatusCode>,
    remove_headers: Vec<HeaderName>,
}

impl Default for RedirectPolicy {
    fn default() -> Self {
        Self {
            permit_redirects: true,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            statuses: vec![
                StatusCode::MOVED_PERMANENTLY,
                StatusCode::FOUND,
                StatusCode::SEE_OTHER,
                StatusCode::TEMPORARY_REDIRECT,
                StatusCode::PERMANENT_REDIRECT,
            ],
            remove_headers: Vec::new(),
        }
    }
}

impl RedirectPolicy {
    /// Create a new policy with the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable redirects entirely, redirect responses are returned as is.
    pub fn with_permit_redirects(mut self, permit: bool) -> Self {
        self.permit_redirects = permit;
        self
    }

    /// Set how many redirects a single call may follow.
    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    /// Replace the statuses treated as redirects.
    pub fn with_redirect_statuses(mut self, statuses: impl IntoIterator<Item = StatusCode>) -> Self {
        self.statuses = statuses.into_iter().collect();
        self
    }

    /// Headers removed from every follow-up request, whatever its origin.
    pub fn with_remove_headers_on_redirect(
        mut self,
        headers: impl IntoIterator<Item = HeaderName>,
    ) -> Self {
        self.remove_headers = headers.into_iter().collect();
        self
    }

    fn location(&self, resp: &Response) -> Option<String> {
        if !self.statuses.contains(&resp.status()) {
            return None;
        }
        let location = resp.headers().get(LOCATION)?;
        match location.to_str() {
            Ok(v) if !v.is_empty() => Some(v.to_string()),
            _ => {
                debug!("ignoring redirect with invalid location: {location:?}");
                None
            }
        }
    }

    fn redirect(&self, req: &mut PipelineRequest, status: StatusCode, target: Uri) {
        let to_get = matches!(
            status,
            StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND | StatusCode::SEE_OTHER
        ) && !matches!(*req.method(), Method::GET | Method::HEAD);
        if to_get {
            *req.request.method_mut() = Method::GET;
            *req.request.body_mut() = Bytes::new();
            for name in [CONTENT_LENGTH, CONTENT_TYPE, TRANSFER_ENCODING] {
                req.headers_mut().remove(name);
            }
        }

        for name in &self.remove_headers {
            req.headers_mut().remove(name);
        }

        *req.request.uri_mut() = target.clone();
        req.context.redirects.push(target);
    }
}

#[async_trait]
impl Policy for RedirectPolicy {
    async fn send(&self, req: &mut PipelineRequest, next: Next<'_>) -> Result<Response> {
        if !self.permit_redirects {
            return next.run(req).await;
        }

        let origin = Origin::of(req.uri());
        let mut remaining = self.max_redirects;

        loop {
            let resp = next.run(req).await?;
            let Some(location) = self.location(&resp) else {
                return Ok(resp);
            };

            if remaining == 0 {
                return Err(Error::too_many_redirects(format!(
                    "exceeded the limit of {} redirects, last location: {location}",
                    self.max_redirects
                )));
            }
            remaining -= 1;

            let target = resolve(req.uri(), &location)?;
            if Origin::of(&target) != origin {
                debug!("following cross origin redirect to {target}");
                req.context.mark_cross_origin_redirect();
            } else {
                debug!("following redirect to {target}");
                req.context.take_cross_origin_redirect();
            }

            self.redirect(req, resp.status(), target);
        }
    }
}

/// Resolve a `Location` against the url it was returned for.
///
/// Relative locations without authority are resolved against the root of
/// `base`.
fn resolve(base: &Uri, location: &str) -> Result<Uri> {
    let invalid = |e: url::ParseError| {
        Error::request_invalid(format!("invalid redirect location {location:?} from {base}"))
            .with_source(e)
    };

    let target = match Url::parse(location) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = Url::parse(&base.to_string()).map_err(invalid)?;
            if location.starts_with('/') {
                base.join(location)
            } else {
                base.join(&format!("/{location}"))
            }
            .map_err(invalid)?
        }
        Err(e) => return Err(invalid(e)),
    };

    Ok(target.as_str().parse()?)
}
