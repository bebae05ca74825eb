//! General purpose HTTP policies for reqchain pipelines.

#![warn(missing_docs)]

mod headers;
pub use headers::HeadersPolicy;

mod user_agent;
pub use user_agent::UserAgentPolicy;

mod logging;
pub use logging::LoggingPolicy;

#[cfg(test)]
mod test_util {
    use async_trait::async_trait;
    use bytes::Bytes;
    use reqchain_core::{HttpSend, Result};
    use std::sync::Mutex;

    /// Transport answering 200 and recording every request.
    #[derive(Debug, Default)]
    pub struct RecordingHttpSend {
        pub requests: Mutex<Vec<http::Request<Bytes>>>,
    }

    impl RecordingHttpSend {
        pub fn header(&self, idx: usize, name: &str) -> Option<String> {
            self.requests.lock().unwrap()[idx]
                .headers()
                .get(name)
                .map(|v| v.to_str().unwrap().to_string())
        }
    }

    #[async_trait]
    impl HttpSend for RecordingHttpSend {
        async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
            self.requests.lock().unwrap().push(req);
            Ok(http::Response::new(Bytes::new()))
        }
    }

    pub fn get(uri: &str) -> http::Request<Bytes> {
        http::Request::get(uri).body(Bytes::new()).unwrap()
    }
}
