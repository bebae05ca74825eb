use crate::pipeline::Next;
use crate::{Context, Error, PipelineRequest, Response, Result, Token, TokenRequestOptions};
use std::fmt::Debug;
use std::sync::Arc;

/// ProvideToken is the trait used by policies to obtain bearer tokens.
///
/// Credential discovery (environment, managed identity, developer tools, ...)
/// lives behind this trait; policies only ever ask for a token.
#[async_trait::async_trait]
pub trait ProvideToken: Debug + Send + Sync + 'static {
    /// Get a token for `scopes`.
    ///
    /// Failures should be reported as
    /// [`ErrorKind::Authentication`](crate::ErrorKind::Authentication); policies
    /// propagate them as is.
    async fn provide_token(
        &self,
        ctx: &Context,
        scopes: &[String],
        options: &TokenRequestOptions,
    ) -> Result<Token>;
}

#[async_trait::async_trait]
impl<T: ProvideToken + ?Sized> ProvideToken for Arc<T> {
    async fn provide_token(
        &self,
        ctx: &Context,
        scopes: &[String],
        options: &TokenRequestOptions,
    ) -> Result<Token> {
        self.as_ref().provide_token(ctx, scopes, options).await
    }
}

/// Policy is one step of a [`Pipeline`](crate::Pipeline).
///
/// A policy receives the request and the rest of the chain. It may return a
/// response on its own, or call [`Next::run`] (possibly more than once) and
/// inspect the response on the way back.
#[async_trait::async_trait]
pub trait Policy: Debug + Send + Sync + 'static {
    /// Process the request.
    async fn send(&self, req: &mut PipelineRequest, next: Next<'_>) -> Result<Response>;
}

#[async_trait::async_trait]
impl<T: Policy + ?Sized> Policy for Arc<T> {
    async fn send(&self, req: &mut PipelineRequest, next: Next<'_>) -> Result<Response> {
        self.as_ref().send(req, next).await
    }
}

/// SansIoPolicy is a policy that never performs I/O on its own.
///
/// It only observes the request before it is sent, the response once it is
/// back, and the error if the rest of the chain failed. Add one to a pipeline
/// with [`Pipeline::push_sansio`](crate::Pipeline::push_sansio).
pub trait SansIoPolicy: Debug + Send + Sync + 'static {
    /// Called before the request is handed to the rest of the chain.
    fn on_request(&self, _req: &mut PipelineRequest) -> Result<()> {
        Ok(())
    }

    /// Called with the response returned by the rest of the chain.
    fn on_response(&self, _req: &PipelineRequest, _resp: &mut Response) -> Result<()> {
        Ok(())
    }

    /// Called when the rest of the chain failed.
    ///
    /// Returning `Err` propagates (possibly another) error, returning `Ok`
    /// replaces the failure with a response. The default propagates `err`.
    fn on_exception(&self, _req: &PipelineRequest, err: Error) -> Result<Response> {
        Err(err)
    }
}
