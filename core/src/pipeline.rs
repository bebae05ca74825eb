use crate::{
    Context, Error, PipelineRequest, Policy, RequestContext, Response, Result, SansIoPolicy,
};
use bytes::Bytes;
use log::debug;
use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::sync::Arc;

/// Pipeline runs requests through an ordered list of policies and then the
/// transport configured in its [`Context`].
///
/// Policies are invoked in the order they were pushed on the way to the
/// transport, and see the response in the reverse order.
///
/// ```no_run
/// use reqchain_core::{Context, Pipeline};
///
/// # async fn example(ctx: Context) -> reqchain_core::Result<()> {
/// let pipeline = Pipeline::new(ctx);
///
/// let req = http::Request::get("https://example.com")
///     .body(bytes::Bytes::new())
///     .unwrap();
/// let resp = pipeline.run(req).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Pipeline {
    ctx: Context,
    policies: Vec<Arc<dyn Policy>>,
}

impl Pipeline {
    /// Create a new pipeline without any policy.
    pub fn new(ctx: Context) -> Self {
        Self {
            ctx,
            policies: Vec::new(),
        }
    }

    /// Append a policy to the chain.
    pub fn push(mut self, policy: impl Policy) -> Self {
        self.policies.push(Arc::new(policy));
        self
    }

    /// Append a sans-io policy to the chain.
    pub fn push_sansio(self, policy: impl SansIoPolicy) -> Self {
        self.push(SansIo(policy))
    }

    /// Get the context of this pipeline.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Number of policies in the chain.
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Check if the chain has no policy.
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Run the request with a default [`RequestContext`].
    pub async fn run(&self, req: http::Request<Bytes>) -> Result<Response> {
        self.run_with_context(req, RequestContext::default()).await
    }

    /// Run the request with the given per-call context.
    ///
    /// If the context carries a timeout, in-flight work is dropped once it
    /// elapses and [`ErrorKind::Timeout`](crate::ErrorKind::Timeout) is returned.
    pub async fn run_with_context(
        &self,
        req: http::Request<Bytes>,
        context: RequestContext,
    ) -> Result<Response> {
        let timeout = context.timeout;
        let mut req = PipelineRequest::with_context(req, context);
        let next = Next {
            ctx: &self.ctx,
            policies: &self.policies,
        };

        match timeout {
            None => next.run(&mut req).await,
            Some(d) => tokio::time::timeout(d, next.run(&mut req))
                .await
                .map_err(|e| {
                    Error::timeout(format!("request did not complete within {d:?}")).with_source(e)
                })?,
        }
    }

    /// Run the request until it completes or `cancel` resolves.
    ///
    /// Once `cancel` resolves, in-flight work is dropped and
    /// [`ErrorKind::Cancelled`](crate::ErrorKind::Cancelled) is returned.
    pub async fn run_until(
        &self,
        req: http::Request<Bytes>,
        context: RequestContext,
        cancel: impl Future<Output = ()>,
    ) -> Result<Response> {
        tokio::select! {
            biased;

            _ = cancel => Err(Error::cancelled("request cancelled by caller")),
            resp = self.run_with_context(req, context) => resp,
        }
    }

    /// Run the request from synchronous code.
    ///
    /// # Panics
    ///
    /// Panics if called from within an async runtime.
    #[cfg(feature = "blocking")]
    pub fn run_blocking(
        &self,
        req: http::Request<Bytes>,
        context: RequestContext,
    ) -> Result<Response> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::unexpected("failed to build blocking runtime").with_source(e))?;

        rt.block_on(self.run_with_context(req, context))
    }
}

/// Next is the remainder of the chain after the current policy.
///
/// It can be run more than once: each run starts again from the same
/// position, so a policy resending a request only replays the policies after
/// itself.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    ctx: &'a Context,
    policies: &'a [Arc<dyn Policy>],
}

impl Debug for Next<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next")
            .field("remaining_policies", &self.policies.len())
            .finish()
    }
}

impl<'a> Next<'a> {
    /// Get the context of the running pipeline.
    pub fn context(&self) -> &'a Context {
        self.ctx
    }

    /// Run the remainder of the chain.
    pub async fn run(self, req: &mut PipelineRequest) -> Result<Response> {
        match self.policies.split_first() {
            Some((policy, rest)) => {
                let next = Next {
                    ctx: self.ctx,
                    policies: rest,
                };
                policy.send(req, next).await
            }
            None => {
                debug!("sending request: {} {}", req.method(), req.uri());
                let resp = self.ctx.http_send(req.request.clone()).await?;
                debug!(
                    "received response: {} for {} {}",
                    resp.status(),
                    req.method(),
                    req.uri()
                );
                Ok(resp)
            }
        }
    }
}

/// Runs a [`SansIoPolicy`] as a [`Policy`].
#[derive(Debug)]
pub struct SansIo<P>(pub P);

#[async_trait::async_trait]
impl<P: SansIoPolicy> Policy for SansIo<P> {
    async fn send(&self, req: &mut PipelineRequest, next: Next<'_>) -> Result<Response> {
        self.0.on_request(req)?;

        let mut resp = match next.run(req).await {
            Ok(resp) => resp,
            Err(err) => return self.0.on_exception(req, err),
        };

        self.0.on_response(req, &mut resp)?;
        Ok(resp)
    }
}
