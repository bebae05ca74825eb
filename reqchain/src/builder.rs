use crate::Config;
use log::debug;
use reqchain_auth::BearerTokenPolicy;
use reqchain_core::{Context, Pipeline, Policy, ProvideToken};
use reqchain_http_policies::{HeadersPolicy, LoggingPolicy, UserAgentPolicy};
use reqchain_redirect::{RedirectPolicy, SensitiveHeaderCleanupPolicy};
use std::sync::Arc;

#[derive(Debug)]
enum Bearer {
    Credential(Arc<dyn ProvideToken>, Vec<String>),
    Policy(BearerTokenPolicy),
}

/// PipelineBuilder assembles a pipeline with the default policies.
///
/// The policies run in this order:
///
/// 1. [`HeadersPolicy`]
/// 2. [`UserAgentPolicy`]
/// 3. [`RedirectPolicy`]
/// 4. [`BearerTokenPolicy`], if configured
/// 5. policies added with [`PipelineBuilder::with_policy`]
/// 6. [`SensitiveHeaderCleanupPolicy`]
/// 7. [`LoggingPolicy`]
///
/// ```no_run
/// use reqchain::auth::StaticTokenProvider;
/// use reqchain::{default_context, Config, PipelineBuilder, Token};
/// use std::time::Duration;
///
/// # fn main() -> reqchain::Result<()> {
/// let ctx = default_context();
/// let config = Config::default().from_env(&ctx)?;
/// let credential = StaticTokenProvider::new(Token::expires_in("token", Duration::from_secs(3600)));
///
/// let pipeline = PipelineBuilder::new(ctx)
///     .with_config(config)
///     .with_bearer_token(credential, ["https://storage.example.com/.default"])
///     .build();
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PipelineBuilder {
    ctx: Context,
    config: Config,
    headers: HeadersPolicy,
    bearer: Option<Bearer>,
    policies: Vec<Arc<dyn Policy>>,
}

impl PipelineBuilder {
    /// Create a new builder using `ctx`.
    pub fn new(ctx: Context) -> Self {
        Self {
            ctx,
            config: Config::default(),
            headers: HeadersPolicy::default(),
            bearer: None,
            policies: Vec::new(),
        }
    }

    /// Use `config` for the default policies.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Add headers sent with every request.
    pub fn with_headers(mut self, headers: HeadersPolicy) -> Self {
        self.headers = headers;
        self
    }

    /// Authorize requests with tokens from `credential`.
    ///
    /// Continuous access evaluation follows [`Config::enable_cae`].
    pub fn with_bearer_token(
        mut self,
        credential: impl ProvideToken,
        scopes: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.bearer = Some(Bearer::Credential(
            Arc::new(credential),
            scopes.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Authorize requests with an already built bearer policy.
    pub fn with_bearer_policy(mut self, policy: BearerTokenPolicy) -> Self {
        self.bearer = Some(Bearer::Policy(policy));
        self
    }

    /// Add a policy running after authorization.
    pub fn with_policy(mut self, policy: impl Policy) -> Self {
        self.policies.push(Arc::new(policy));
        self
    }

    /// Build the pipeline.
    pub fn build(self) -> Pipeline {
        let mut user_agent = UserAgentPolicy::new();
        if let Some(id) = &self.config.application_id {
            user_agent = user_agent.with_application_id(id);
        }
        if let Some(suffix) = &self.config.user_agent_suffix {
            user_agent = user_agent.with_suffix(suffix);
        }

        let mut redirect = RedirectPolicy::new();
        if let Some(max) = self.config.max_redirects {
            redirect = redirect.with_max_redirects(max);
        }

        let cleanup = SensitiveHeaderCleanupPolicy::new().with_disable_redirect_cleanup(
            self.config.disable_redirect_cleanup.unwrap_or_default(),
        );

        let mut pipeline = Pipeline::new(self.ctx)
            .push(self.headers)
            .push(user_agent)
            .push(redirect);
        match self.bearer {
            Some(Bearer::Credential(credential, scopes)) => {
                let enable_cae = self.config.enable_cae.unwrap_or_default();
                pipeline =
                    pipeline.push(BearerTokenPolicy::new(credential, scopes).with_enable_cae(enable_cae));
            }
            Some(Bearer::Policy(policy)) => pipeline = pipeline.push(policy),
            None => {}
        }
        for policy in self.policies {
            pipeline = pipeline.push(policy);
        }

        let pipeline = pipeline.push(cleanup).push(LoggingPolicy::new());
        debug!("built pipeline with {} policies", pipeline.len());
        pipeline
    }
}
