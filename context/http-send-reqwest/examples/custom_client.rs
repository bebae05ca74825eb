use bytes::Bytes;
use reqchain_core::{Context, Pipeline};
use reqchain_http_send_reqwest::ReqwestHttpSend;
use reqwest::{redirect, Client};
use std::time::Duration;

#[tokio::main]
async fn main() -> reqchain_core::Result<()> {
    let _ = env_logger::try_init();

    // Let the pipeline handle redirects.
    let client = Client::builder()
        .timeout(Duration::from_secs(30))
        .pool_max_idle_per_host(10)
        .redirect(redirect::Policy::none())
        .build()
        .map_err(|e| reqchain_core::Error::unexpected("failed to build client").with_source(e))?;

    let ctx = Context::new().with_http_send(ReqwestHttpSend::new(client));
    let pipeline = Pipeline::new(ctx);

    let req = http::Request::get("https://httpbin.org/get")
        .header("x-test-header", "reqchain-example")
        .body(Bytes::new())?;

    match pipeline.run(req).await {
        Ok(resp) => {
            println!("Response status: {}", resp.status());
            for (name, value) in resp.headers() {
                println!("  {name}: {value:?}");
            }
        }
        Err(e) => eprintln!("Request failed: {e}"),
    }

    Ok(())
}
