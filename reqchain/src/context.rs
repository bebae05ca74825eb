use reqchain_core::{Context, OsEnv};
use reqchain_http_send_reqwest::ReqwestHttpSend;

/// Create a context sending requests with reqwest and reading the OS environment.
///
/// The reqwest client never follows redirects on its own, add a
/// `RedirectPolicy` to the pipeline instead.
pub fn default_context() -> Context {
    Context::new()
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv)
}
