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
use http::{HeaderName, HeaderValue};
use reqchain_core::utils::Redact;
use reqchain_core::{Next, PipelineRequest, Policy, Response, Result};
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, RwLock};

/// KeyCredential holds an API key that can be rotated while in use.
///
/// Clones share the same key, so updating one updates every policy using it.
#[derive(Clone)]
pub struct KeyCredential {
    key: Arc<RwLock<String>>,
}

impl Debug for KeyCredential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyCredential")
            .field("key", &Redact::from(self.key().as_str()))
            .finish()
    }
}

impl KeyCredential {
    /// Create a new key credential.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: Arc::new(RwLock::new(key.into())),
        }
    }

    /// Get the current key.
    pub fn key(&self) -> String {
        self.key.read().expect("lock poisoned").clone()
    }

    /// Replace the key.
    pub fn update(&self, key: impl Into<String>) {
        *self.key.write().expect("lock poisoned") = key.into();
    }
}

/// KeyCredentialPolicy puts an API key into a request header.
///
/// ```
/// use reqchain_auth::{KeyCredential, KeyCredentialPolicy};
///
/// let policy = KeyCredentialPolicy::new(KeyCredential::new("secret"), "Authorization")
///     .unwrap()
///     .with_prefix("SharedAccessKey");
/// ```
#[derive(Debug)]
pub struct KeyCredentialPolicy {
    credential: KeyCredential,
    name: HeaderName,
    prefix: Option<String>,
}

impl KeyCredentialPolicy {
    /// Create a new policy writing the key into header `name`.
    ///
    /// Fails if `name` is not a valid header name.
    pub fn new(credential: KeyCredential, name: &str) -> Result<Self> {
        Ok(Self {
            credential,
            name: HeaderName::try_from(name)?,
            prefix: None,
        })
    }

    /// Send `<prefix> <key>` instead of the bare key.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }
}

#[async_trait]
impl Policy for KeyCredentialPolicy {
    async fn send(&self, req: &mut PipelineRequest, next: Next<'_>) -> Result<Response> {
        let key = self.credential.key();
        let value = match &self.prefix {
            Some(prefix) => format!("{prefix} {key}"),
            None => key,
        };

        let mut value = HeaderValue::try_from(value)?;
        value.set_sensitive(true);
        req.headers_mut().insert(self.name.clone(), value);

        next.run(req).await
    }
}
