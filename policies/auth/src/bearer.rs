use crate::challenge::insufficient_claims;
use async_trait::async_trait;
use http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use http::{HeaderValue, StatusCode};
use log::debug;
use reqchain_core::{
    Context, Error, Next, PipelineRequest, Policy, ProvideToken, Response, Result, Token,
    TokenRequestOptions,
};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Hooks called by [`BearerTokenPolicy`] around every send.
///
/// Every method has a default, so implementors only override what they need.
#[async_trait]
pub trait AuthorizationHooks: Debug + Send + Sync + 'static {
    /// Called once the request is authorized, before it is sent.
    fn on_request(&self, _req: &mut PipelineRequest) -> Result<()> {
        Ok(())
    }

    /// Called with the response of every send, including the challenge resend.
    fn on_response(&self, _req: &PipelineRequest, _resp: &Response) -> Result<()> {
        Ok(())
    }

    /// Called when a send failed. The returned error is propagated.
    fn on_exception(&self, _req: &PipelineRequest, err: Error) -> Error {
        err
    }

    /// Called with a 401 response carrying `WWW-Authenticate`.
    ///
    /// Return `true` once `req` has been authorized again to have it resent
    /// once, `false` to return the 401 to the caller.
    ///
    /// The default handles Bearer `insufficient_claims` challenges by asking
    /// the credential for a token satisfying the decoded claims.
    async fn on_challenge(
        &self,
        policy: &BearerTokenPolicy,
        ctx: &Context,
        req: &mut PipelineRequest,
        resp: &Response,
    ) -> Result<bool> {
        let Some(header) = resp
            .headers()
            .get(WWW_AUTHENTICATE)
            .and_then(|v| v.to_str().ok())
        else {
            return Ok(false);
        };
        let Some(claims) = insufficient_claims(header) else {
            return Ok(false);
        };

        debug!("received claims challenge, requesting a new token");
        let options = TokenRequestOptions::default().with_claims(claims);
        policy.authorize_request(ctx, req, options).await?;
        Ok(true)
    }
}

/// The hooks used when none are configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultAuthorization;

impl AuthorizationHooks for DefaultAuthorization {}

/// BearerTokenPolicy authorizes requests with `Authorization: Bearer <token>`.
///
/// Tokens come from a [`ProvideToken`] and are cached by the policy. A cached
/// token is reused until it gets within [`REFRESH_SKEW`](reqchain_core::REFRESH_SKEW)
/// of its expiry or reaches its refresh time. Concurrent requests needing a
/// token share a single credential call.
///
/// Credentials are only attached to https requests, unless the request
/// context opts out with `enforce_https = false`.
pub struct BearerTokenPolicy {
    credential: Arc<dyn ProvideToken>,
    scopes: Vec<String>,
    enable_cae: bool,
    token: Mutex<Option<Token>>,
    hooks: Arc<dyn AuthorizationHooks>,
}

impl Debug for BearerTokenPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerTokenPolicy")
            .field("credential", &self.credential)
            .field("scopes", &self.scopes)
            .field("enable_cae", &self.enable_cae)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

impl BearerTokenPolicy {
    /// Create a new policy requesting tokens for `scopes`.
    pub fn new(
        credential: impl ProvideToken,
        scopes: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            credential: Arc::new(credential),
            scopes: scopes.into_iter().map(Into::into).collect(),
            enable_cae: false,
            token: Mutex::new(None),
            hooks: Arc::new(DefaultAuthorization),
        }
    }

    /// Ask for tokens supporting continuous access evaluation.
    pub fn with_enable_cae(mut self, enable_cae: bool) -> Self {
        self.enable_cae = enable_cae;
        self
    }

    /// Replace the hooks called around every send.
    pub fn with_hooks(mut self, hooks: impl AuthorizationHooks) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    /// Scopes requested on every credential call.
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Get a snapshot of the cached token.
    pub async fn cached_token(&self) -> Option<Token> {
        self.token.lock().await.clone()
    }

    /// Get a new token with `options`, cache it and authorize `req` with it.
    ///
    /// The cache is bypassed: the credential is always called.
    pub async fn authorize_request(
        &self,
        ctx: &Context,
        req: &mut PipelineRequest,
        options: TokenRequestOptions,
    ) -> Result<()> {
        let options = self.with_cae(options);

        let mut guard = self.token.lock().await;
        let token = self
            .credential
            .provide_token(ctx, &self.scopes, &options)
            .await?;
        *guard = Some(token.clone());
        drop(guard);

        set_authorization(req, &token)
    }

    /// Authorize `req` with the cached token, refreshing it if needed.
    async fn authorize_cached(&self, ctx: &Context, req: &mut PipelineRequest) -> Result<()> {
        let token = {
            let mut guard = self.token.lock().await;
            match guard.as_ref() {
                Some(token) if !token.needs_refresh() => token.clone(),
                _ => {
                    debug!("bearer token is missing or about to expire, refreshing");
                    let options = self.with_cae(TokenRequestOptions::default());
                    let token = self
                        .credential
                        .provide_token(ctx, &self.scopes, &options)
                        .await?;
                    *guard = Some(token.clone());
                    token
                }
            }
        };

        set_authorization(req, &token)
    }

    fn with_cae(&self, options: TokenRequestOptions) -> TokenRequestOptions {
        if self.enable_cae {
            options.with_enable_cae(true)
        } else {
            options
        }
    }

    async fn send_once(&self, req: &mut PipelineRequest, next: Next<'_>) -> Result<Response> {
        match next.run(req).await {
            Ok(resp) => {
                self.hooks.on_response(req, &resp)?;
                Ok(resp)
            }
            Err(err) => Err(self.hooks.on_exception(req, err)),
        }
    }
}

#[async_trait]
impl Policy for BearerTokenPolicy {
    async fn send(&self, req: &mut PipelineRequest, next: Next<'_>) -> Result<Response> {
        if req.context.enforce_https() && !req.is_https() {
            return Err(Error::insecure_transport(
                "Bearer token authentication is not permitted for non-TLS protected (non-https) URLs.",
            ));
        }

        let ctx = next.context();
        self.authorize_cached(ctx, req).await?;
        self.hooks.on_request(req)?;

        let resp = self.send_once(req, next).await?;
        if resp.status() != StatusCode::UNAUTHORIZED {
            return Ok(resp);
        }

        *self.token.lock().await = None;
        if !resp.headers().contains_key(WWW_AUTHENTICATE) {
            return Ok(resp);
        }

        if !self.hooks.on_challenge(self, ctx, req, &resp).await? {
            debug!("challenge not satisfied, returning 401");
            return Ok(resp);
        }
        // The resend carries credentials for the origin that challenged.
        req.context.take_cross_origin_redirect();

        self.send_once(req, next).await
    }
}

fn set_authorization(req: &mut PipelineRequest, token: &Token) -> Result<()> {
    let mut value = HeaderValue::try_from(format!("Bearer {}", token.value()))?;
    value.set_sensitive(true);
    req.headers_mut().insert(AUTHORIZATION, value);
    Ok(())
}
