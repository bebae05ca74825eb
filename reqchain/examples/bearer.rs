use async_trait::async_trait;
use reqchain::{
    default_context, Config, Context, Error, PipelineBuilder, ProvideToken, Result, Token,
    TokenRequestOptions,
};
use std::time::Duration;

/// Reads a pre-issued token from `REQCHAIN_EXAMPLE_TOKEN`.
#[derive(Debug)]
struct EnvTokenProvider;

#[async_trait]
impl ProvideToken for EnvTokenProvider {
    async fn provide_token(
        &self,
        ctx: &Context,
        scopes: &[String],
        _options: &TokenRequestOptions,
    ) -> Result<Token> {
        let value = ctx
            .env_var("REQCHAIN_EXAMPLE_TOKEN")
            .ok_or_else(|| Error::authentication("REQCHAIN_EXAMPLE_TOKEN is not set"))?;
        log::info!("providing token for scopes {scopes:?}");
        Ok(Token::expires_in(value, Duration::from_secs(3600)))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = env_logger::try_init();

    let ctx = default_context();
    let config = Config::default().from_env(&ctx)?;
    let pipeline = PipelineBuilder::new(ctx)
        .with_config(config.clone())
        .with_bearer_token(EnvTokenProvider, ["https://storage.example.com/.default"])
        .build();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://httpbin.org/bearer".to_string());
    let req = http::Request::get(url).body(bytes::Bytes::new())?;

    match pipeline.run_with_context(req, config.request_context()).await {
        Ok(resp) => println!("Response status: {}", resp.status()),
        Err(err) => eprintln!("Request failed ({}): {err}", err.kind()),
    }

    Ok(())
}
