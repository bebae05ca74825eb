mod sansio;

use async_trait::async_trait;
use bytes::Bytes;
use reqchain_core::{HttpSend, Result};
use std::collections::VecDeque;
use std::sync::Mutex;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Transport replaying scripted results and recording every request it sees.
#[derive(Debug, Default)]
pub struct ScriptedHttpSend {
    responses: Mutex<VecDeque<Result<http::Response<Bytes>>>>,
    requests: Mutex<Vec<http::Request<Bytes>>>,
}

impl ScriptedHttpSend {
    pub fn push(&self, resp: Result<http::Response<Bytes>>) {
        self.responses.lock().unwrap().push_back(resp);
    }

    pub fn requests(&self) -> Vec<http::Request<Bytes>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpSend for ScriptedHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        self.requests.lock().unwrap().push(req);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(http::Response::new(Bytes::new())))
    }
}

pub fn get(uri: &str) -> http::Request<Bytes> {
    http::Request::get(uri).body(Bytes::new()).unwrap()
}
