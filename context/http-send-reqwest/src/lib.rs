//! [`HttpSend`] implementation backed by [`reqwest`].
//!
//! Redirects are handled by the pipeline, so the default client built here
//! never follows them on its own.

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::BodyExt;
use log::warn;
use reqchain_core::{Error, HttpSend, Result};
use reqwest::{redirect, Client, Request};

/// Transport sending requests with a [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestHttpSend {
    client: Client,
}

impl Default for ReqwestHttpSend {
    fn default() -> Self {
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .build()
            .unwrap_or_else(|err| {
                warn!("failed to build reqwest client without redirects, using default: {err}");
                Client::new()
            });

        Self { client }
    }
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a reqwest::Client.
    ///
    /// The client should be built with `redirect::Policy::none()`, otherwise
    /// credentials may follow a redirect to another origin.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let req = Request::try_from(req)
            .map_err(|e| Error::request_invalid("failed to convert request").with_source(e))?;
        let resp: http::Response<_> = self
            .client
            .execute(req)
            .await
            .map_err(|e| Error::service_request("failed to send request").with_source(e))?
            .into();

        let (parts, body) = resp.into_parts();
        let bs = BodyExt::collect(body)
            .await
            .map(|buf| buf.to_bytes())
            .map_err(|e| Error::service_response("failed to read response body").with_source(e))?;
        Ok(http::Response::from_parts(parts, bs))
    }
}
