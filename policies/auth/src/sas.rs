// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use async_trait::async_trait;
use http::Uri;
use reqchain_core::utils::Redact;
use reqchain_core::{Error, Next, PipelineRequest, Policy, Response, Result};
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, RwLock};
use url::{form_urlencoded, Url};

/// SasCredential holds an existing shared access signature.
///
/// Clones share the same signature, see [`SasCredential::update`].
#[derive(Clone)]
pub struct SasCredential {
    signature: Arc<RwLock<String>>,
}

impl Debug for SasCredential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SasCredential")
            .field("signature", &Redact::from(self.signature().as_str()))
            .finish()
    }
}

impl SasCredential {
    /// Create a new credential from a signature, with or without leading `?`.
    pub fn new(signature: impl Into<String>) -> Self {
        Self {
            signature: Arc::new(RwLock::new(signature.into())),
        }
    }

    /// Get the current signature.
    pub fn signature(&self) -> String {
        self.signature.read().expect("lock poisoned").clone()
    }

    /// Replace the signature.
    pub fn update(&self, signature: impl Into<String>) {
        *self.signature.write().expect("lock poisoned") = signature.into();
    }
}

/// SasCredentialPolicy appends a shared access signature to the request query.
#[derive(Debug)]
pub struct SasCredentialPolicy {
    credential: SasCredential,
}

impl SasCredentialPolicy {
    /// Create a new policy.
    pub fn new(credential: SasCredential) -> Self {
        Self { credential }
    }
}

#[async_trait]
impl Policy for SasCredentialPolicy {
    async fn send(&self, req: &mut PipelineRequest, next: Next<'_>) -> Result<Response> {
        let uri = append_signature(req.uri(), &self.credential.signature())?;
        *req.request.uri_mut() = uri;

        next.run(req).await
    }
}

fn append_signature(uri: &Uri, signature: &str) -> Result<Uri> {
    let signature = signature.strip_prefix('?').unwrap_or(signature);
    let mut url = Url::parse(&uri.to_string())
        .map_err(|e| Error::request_invalid(format!("invalid request url {uri}")).with_source(e))?;

    let query = match url.query().filter(|q| !q.is_empty()) {
        Some(query) => {
            let existing: Vec<_> = url.query_pairs().collect();
            if form_urlencoded::parse(signature.as_bytes()).all(|pair| existing.contains(&pair)) {
                return Ok(uri.clone());
            }
            format!("{query}&{signature}")
        }
        None => signature.to_string(),
    };
    url.set_query(Some(&query));

    Ok(url.as_str().parse()?)
}
