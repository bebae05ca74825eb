use async_trait::async_trait;
use bytes::Bytes;
use http::HeaderValue;
use reqchain_core::{
    Context, HttpSend, Next, Pipeline, PipelineRequest, Policy, RequestContext, Response, Result,
    SansIoPolicy,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

// A transport that echoes the request headers back instead of touching the network.
#[derive(Debug)]
struct EchoHttpSend;

#[async_trait]
impl HttpSend for EchoHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let mut body = String::new();
        for (name, value) in req.headers() {
            body.push_str(&format!("{}: {}\n", name, value.to_str().unwrap_or("<binary>")));
        }

        Ok(http::Response::new(Bytes::from(body)))
    }
}

// A policy that controls the rest of the chain.
#[derive(Debug, Default)]
struct RequestIdPolicy {
    next_id: AtomicU64,
}

#[async_trait]
impl Policy for RequestIdPolicy {
    async fn send(&self, req: &mut PipelineRequest, next: Next<'_>) -> Result<Response> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        req.headers_mut()
            .insert("x-request-id", HeaderValue::from_str(&id.to_string())?);
        next.run(req).await
    }
}

// A policy that only observes the request.
#[derive(Debug)]
struct TracePolicy;

impl SansIoPolicy for TracePolicy {
    fn on_request(&self, req: &mut PipelineRequest) -> Result<()> {
        println!("about to send {} {}", req.method(), req.uri());
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let ctx = Context::new().with_http_send(EchoHttpSend);
    let pipeline = Pipeline::new(ctx)
        .push(RequestIdPolicy::default())
        .push_sansio(TracePolicy);

    for _ in 0..3 {
        let req = http::Request::get("https://example.com").body(Bytes::new())?;
        let resp = pipeline
            .run_with_context(req, RequestContext::default().with_timeout(Duration::from_secs(5)))
            .await?;
        println!("{}", String::from_utf8_lossy(resp.body()));
    }

    Ok(())
}
