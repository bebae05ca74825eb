use async_trait::async_trait;
use bytes::Bytes;
use http::header::{AUTHORIZATION, LOCATION, USER_AGENT, WWW_AUTHENTICATE};
use http::{HeaderName, HeaderValue, StatusCode};
use pretty_assertions::assert_eq;
use reqchain::auth::{BearerTokenPolicy, StaticTokenProvider};
use reqchain::policies::HeadersPolicy;
use reqchain::{
    Config, Context, ErrorKind, HttpSend, PipelineBuilder, ProvideToken, Result, StaticEnv, Token,
    TokenRequestOptions,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Default)]
struct ScriptedHttpSend {
    responses: Mutex<VecDeque<http::Response<Bytes>>>,
    requests: Mutex<Vec<http::Request<Bytes>>>,
}

impl ScriptedHttpSend {
    fn push(&self, status: StatusCode, headers: &[(HeaderName, &str)]) {
        let mut resp = http::Response::new(Bytes::new());
        *resp.status_mut() = status;
        for (name, value) in headers {
            resp.headers_mut()
                .insert(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        self.responses.lock().unwrap().push_back(resp);
    }

    fn requests(&self) -> Vec<http::Request<Bytes>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpSend for ScriptedHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        self.requests.lock().unwrap().push(req);
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| http::Response::new(Bytes::new())))
    }
}

#[derive(Debug, Default)]
struct ClaimsAwareCredential {
    options: Mutex<Vec<TokenRequestOptions>>,
}

#[async_trait]
impl ProvideToken for ClaimsAwareCredential {
    async fn provide_token(
        &self,
        _: &Context,
        _: &[String],
        options: &TokenRequestOptions,
    ) -> Result<Token> {
        self.options.lock().unwrap().push(options.clone());
        let value = if options.claims.is_some() {
            "with-claims"
        } else {
            "plain"
        };
        Ok(Token::expires_in(value, Duration::from_secs(3600)))
    }
}

fn get(uri: &str) -> http::Request<Bytes> {
    http::Request::get(uri).body(Bytes::new()).unwrap()
}

fn header(req: &http::Request<Bytes>, name: HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .map(|v| v.to_str().unwrap().to_string())
}

#[tokio::test]
async fn test_default_pipeline() {
    init_logger();

    let transport = Arc::new(ScriptedHttpSend::default());
    // Claims challenge, then a cross origin redirect.
    transport.push(
        StatusCode::UNAUTHORIZED,
        &[(
            WWW_AUTHENTICATE,
            r#"Bearer realm="", error="insufficient_claims", claims="eyJhY2Nlc3NfdG9rZW4iOnsiZm9vIjoiYmFyIn19""#,
        )],
    );
    transport.push(
        StatusCode::TEMPORARY_REDIRECT,
        &[(LOCATION, "https://mirror.example.com/blob")],
    );

    let ctx = Context::new()
        .with_http_send(transport.clone())
        .with_env(StaticEnv {
            envs: HashMap::from([
                ("REQCHAIN_APPLICATION_ID".to_string(), "myapp/1.0".to_string()),
                ("REQCHAIN_ENABLE_CAE".to_string(), "true".to_string()),
            ]),
        });
    let config = Config::default().from_env(&ctx).unwrap();
    let credential = Arc::new(ClaimsAwareCredential::default());
    let pipeline = PipelineBuilder::new(ctx)
        .with_config(config)
        .with_headers(HeadersPolicy::new().with_header(
            HeaderName::from_static("x-tenant"),
            HeaderValue::from_static("contoso"),
        ))
        .with_bearer_token(credential.clone(), ["https://storage.example.com/.default"])
        .build();
    assert_eq!(pipeline.len(), 6);

    let resp = pipeline
        .run(get("https://storage.example.com/blob"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let requests = transport.requests();
    assert_eq!(requests.len(), 3);

    assert_eq!(
        header(&requests[0], AUTHORIZATION).as_deref(),
        Some("Bearer plain")
    );
    assert_eq!(
        header(&requests[1], AUTHORIZATION).as_deref(),
        Some("Bearer with-claims")
    );
    assert_eq!(requests[2].uri(), "https://mirror.example.com/blob");
    assert_eq!(header(&requests[2], AUTHORIZATION), None);

    for req in &requests {
        assert_eq!(header(req, HeaderName::from_static("x-tenant")).as_deref(), Some("contoso"));
        assert!(header(req, USER_AGENT)
            .unwrap()
            .starts_with("myapp/1.0 reqchain/"));
    }

    let options = credential.options.lock().unwrap().clone();
    assert_eq!(options.len(), 2);
    assert!(options.iter().all(|o| o.enable_cae));
}

#[tokio::test]
async fn test_redirect_cleanup_disabled_by_config() {
    let transport = Arc::new(ScriptedHttpSend::default());
    transport.push(StatusCode::FOUND, &[(LOCATION, "https://other.example.com/")]);

    let config = Config {
        disable_redirect_cleanup: Some(true),
        ..Default::default()
    };
    let credential =
        StaticTokenProvider::new(Token::expires_in("static", Duration::from_secs(3600)));
    let pipeline = PipelineBuilder::new(Context::new().with_http_send(transport.clone()))
        .with_config(config)
        .with_bearer_policy(BearerTokenPolicy::new(credential, ["scope"]))
        .build();

    pipeline
        .run(get("https://storage.example.com/"))
        .await
        .unwrap();

    assert_eq!(
        header(&transport.requests()[1], AUTHORIZATION).as_deref(),
        Some("Bearer static")
    );
}

#[tokio::test]
async fn test_max_redirects_from_config() {
    let transport = Arc::new(ScriptedHttpSend::default());
    for _ in 0..3 {
        transport.push(StatusCode::FOUND, &[(LOCATION, "/again")]);
    }

    let config = Config {
        max_redirects: Some(2),
        ..Default::default()
    };
    let pipeline = PipelineBuilder::new(Context::new().with_http_send(transport.clone()))
        .with_config(config)
        .build();

    let err = pipeline
        .run(get("https://storage.example.com/"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TooManyRedirects);
    assert_eq!(transport.requests().len(), 3);
}
