use crate::{get, ScriptedHttpSend};
use bytes::Bytes;
use http::{HeaderValue, StatusCode};
use pretty_assertions::assert_eq;
use reqchain_core::{
    Context, Error, ErrorKind, Pipeline, PipelineRequest, Response, Result, SansIoPolicy,
};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Hooks {
    calls: Arc<Mutex<Vec<&'static str>>>,
    recover: bool,
}

impl SansIoPolicy for Hooks {
    fn on_request(&self, req: &mut PipelineRequest) -> Result<()> {
        self.calls.lock().unwrap().push("request");
        req.headers_mut()
            .insert("x-sansio", HeaderValue::from_static("1"));
        Ok(())
    }

    fn on_response(&self, _: &PipelineRequest, resp: &mut Response) -> Result<()> {
        self.calls.lock().unwrap().push("response");
        resp.headers_mut()
            .insert("x-seen", HeaderValue::from_static("1"));
        Ok(())
    }

    fn on_exception(&self, _: &PipelineRequest, err: Error) -> Result<Response> {
        self.calls.lock().unwrap().push("exception");
        if !self.recover {
            return Err(err);
        }
        Ok(http::Response::builder()
            .status(StatusCode::BAD_GATEWAY)
            .body(Bytes::new())?)
    }
}

#[tokio::test]
async fn test_sansio_hooks() {
    let transport = Arc::new(ScriptedHttpSend::default());
    let hooks = Hooks::default();
    let calls = hooks.calls.clone();
    let pipeline = Pipeline::new(Context::new().with_http_send(transport.clone())).push_sansio(hooks);

    let resp = pipeline.run(get("https://localhost")).await.unwrap();

    assert_eq!(*calls.lock().unwrap(), vec!["request", "response"]);
    assert_eq!(resp.headers()["x-seen"], "1");
    assert_eq!(transport.requests()[0].headers()["x-sansio"], "1");
}

#[tokio::test]
async fn test_sansio_exception_propagates_by_default() {
    let transport = Arc::new(ScriptedHttpSend::default());
    transport.push(Err(Error::service_response("connection reset")));
    let hooks = Hooks::default();
    let calls = hooks.calls.clone();
    let pipeline = Pipeline::new(Context::new().with_http_send(transport)).push_sansio(hooks);

    let err = pipeline.run(get("https://localhost")).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ServiceResponse);
    assert_eq!(*calls.lock().unwrap(), vec!["request", "exception"]);
}

#[tokio::test]
async fn test_sansio_exception_recovers() {
    let transport = Arc::new(ScriptedHttpSend::default());
    transport.push(Err(Error::service_response("connection reset")));
    let hooks = Hooks {
        recover: true,
        ..Default::default()
    };
    let pipeline = Pipeline::new(Context::new().with_http_send(transport)).push_sansio(hooks);

    let resp = pipeline.run(get("https://localhost")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
}
