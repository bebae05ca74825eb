use async_trait::async_trait;
use http::header::{AUTHORIZATION, COOKIE, PROXY_AUTHORIZATION, SET_COOKIE};
use http::{HeaderMap, HeaderName, Uri};
use log::{debug, log_enabled, warn, Level};
use reqchain_core::utils::Redact;
use reqchain_core::{Next, PipelineRequest, Policy, Response, Result};
use std::fmt::Write;
use std::time::Instant;
use url::Url;

/// LoggingPolicy logs every request and response at debug level.
///
/// Values of sensitive headers and query parameters are redacted. Headers
/// marked sensitive on the request are always redacted.
#[derive(Debug, Clone)]
pub struct LoggingPolicy {
    redacted_headers: Vec<HeaderName>,
    allowed_query_params: Vec<String>,
}

impl Default for LoggingPolicy {
    fn default() -> Self {
        Self {
            redacted_headers: vec![
                AUTHORIZATION,
                PROXY_AUTHORIZATION,
                COOKIE,
                SET_COOKIE,
                HeaderName::from_static("x-ms-authorization-auxiliary"),
                HeaderName::from_static("api-key"),
            ],
            allowed_query_params: Vec::new(),
        }
    }
}

impl LoggingPolicy {
    /// Create a new policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Redact these headers as well.
    pub fn with_redacted_headers(mut self, headers: impl IntoIterator<Item = HeaderName>) -> Self {
        self.redacted_headers.extend(headers);
        self
    }

    /// Log the values of these query parameters as is.
    pub fn with_allowed_query_params(
        mut self,
        params: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.allowed_query_params
            .extend(params.into_iter().map(Into::into));
        self
    }

    fn format_headers(&self, headers: &HeaderMap) -> String {
        let mut s = String::new();
        for (name, value) in headers {
            let _ = if value.is_sensitive() || self.redacted_headers.contains(name) {
                write!(s, "\n    {name}: {:?}", Redact::from(value))
            } else {
                write!(s, "\n    {name}: {value:?}")
            };
        }
        s
    }

    fn format_uri(&self, uri: &Uri) -> String {
        let Ok(mut url) = Url::parse(&uri.to_string()) else {
            return uri.path().to_string();
        };
        if url.query().is_none() {
            return url.to_string();
        }

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| {
                let v = if self.allowed_query_params.iter().any(|a| *a == k) {
                    v.into_owned()
                } else {
                    "REDACTED".to_string()
                };
                (k.into_owned(), v)
            })
            .collect();
        url.query_pairs_mut().clear().extend_pairs(pairs);
        url.to_string()
    }
}

#[async_trait]
impl Policy for LoggingPolicy {
    async fn send(&self, req: &mut PipelineRequest, next: Next<'_>) -> Result<Response> {
        if !log_enabled!(Level::Debug) {
            return next.run(req).await;
        }

        let uri = self.format_uri(req.uri());
        debug!(
            "request: {} {uri}{}",
            req.method(),
            self.format_headers(req.headers())
        );

        let start = Instant::now();
        let result = next.run(req).await;
        match &result {
            Ok(resp) => debug!(
                "response: {} for {} {uri} in {:?}{}",
                resp.status(),
                req.method(),
                start.elapsed(),
                self.format_headers(resp.headers())
            ),
            Err(err) => warn!(
                "request failed: {} {uri} in {:?}: {err}",
                req.method(),
                start.elapsed()
            ),
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{get, RecordingHttpSend};
    use http::HeaderValue;
    use reqchain_core::{Context, Pipeline};
    use std::sync::Arc;
    use test_case::test_case;

    #[test_case("https://localhost/path", "https://localhost/path"; "no query")]
    #[test_case("https://localhost/?sig=secret&sv=2024", "https://localhost/?sig=REDACTED&sv=2024"; "allowed param")]
    #[test_case("https://localhost/?flag&sig=secret", "https://localhost/?flag=REDACTED&sig=REDACTED"; "param without value")]
    #[test_case("https://localhost/?sig=a%26b%3Dc&sv=2024", "https://localhost/?sig=REDACTED&sv=2024"; "encoded separators")]
    #[test_case("https://localhost/?next=https://other/?sig=x", "https://localhost/?next=REDACTED"; "url in value")]
    fn test_format_uri(uri: &str, expected: &str) {
        let policy = LoggingPolicy::new().with_allowed_query_params(["sv"]);
        assert_eq!(policy.format_uri(&uri.parse().unwrap()), expected);
    }

    #[test]
    fn test_format_headers_redacts_secrets() {
        let policy =
            LoggingPolicy::new().with_redacted_headers([HeaderName::from_static("x-secret")]);

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_static("Bearer eyJ0eXAiOiJKV1QiLCJhbGciOiJSUzI1NiJ9"),
        );
        headers.insert("x-secret", HeaderValue::from_static("0123456789abcdef"));
        let mut marked = HeaderValue::from_static("marked-sensitive-value");
        marked.set_sensitive(true);
        headers.insert("x-marked", marked);
        headers.insert("x-request-id", HeaderValue::from_static("42"));

        let got = policy.format_headers(&headers);
        assert!(!got.contains("eyJ0eXAiOiJKV1QiLCJhbGciOiJSUzI1NiJ9"));
        assert!(!got.contains("0123456789abcdef"));
        assert!(!got.contains("marked-sensitive-value"));
        assert!(got.contains("x-request-id: \"42\""));
    }

    #[tokio::test]
    async fn test_logging_policy_passes_through() {
        let _ = env_logger::builder()
            .is_test(true)
            .filter_level(log::LevelFilter::Debug)
            .try_init();

        let transport = Arc::new(RecordingHttpSend::default());
        let pipeline =
            Pipeline::new(Context::new().with_http_send(transport.clone())).push(LoggingPolicy::new());

        let resp = pipeline.run(get("https://localhost/?sig=secret")).await.unwrap();

        assert_eq!(resp.status(), http::StatusCode::OK);
        assert_eq!(transport.requests.lock().unwrap().len(), 1);
    }
}
