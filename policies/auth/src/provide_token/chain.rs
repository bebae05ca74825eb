use async_trait::async_trait;
use log::{debug, warn};
use reqchain_core::{Context, Error, ProvideToken, Result, Token, TokenRequestOptions};
use std::fmt::{self, Debug};
use std::sync::Arc;

/// A chain of token providers that will be tried in order.
///
/// The first provider returning a token wins. If every provider fails, an
/// [`ErrorKind::Authentication`](reqchain_core::ErrorKind::Authentication)
/// error listing each failure is returned.
#[derive(Clone, Default)]
pub struct ProvideTokenChain {
    providers: Vec<Arc<dyn ProvideToken>>,
}

impl ProvideTokenChain {
    /// Create a new empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a provider to the chain.
    pub fn push(mut self, provider: impl ProvideToken) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }
}

impl Debug for ProvideTokenChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvideTokenChain")
            .field("providers_count", &self.providers.len())
            .finish()
    }
}

#[async_trait]
impl ProvideToken for ProvideTokenChain {
    async fn provide_token(
        &self,
        ctx: &Context,
        scopes: &[String],
        options: &TokenRequestOptions,
    ) -> Result<Token> {
        let mut failures = Vec::with_capacity(self.providers.len());

        for provider in &self.providers {
            debug!("trying token provider: {provider:?}");

            match provider.provide_token(ctx, scopes, options).await {
                Ok(token) => return Ok(token),
                Err(err) => {
                    warn!("token provider {provider:?} failed: {err}");
                    failures.push(err.to_string());
                }
            }
        }

        Err(Error::authentication(format!(
            "no token provider succeeded: [{}]",
            failures.join("; ")
        )))
    }
}
