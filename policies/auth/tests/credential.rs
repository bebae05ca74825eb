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

use crate::{get, ScriptedHttpSend};
use pretty_assertions::assert_eq;
use reqchain_auth::{
    KeyCredential, KeyCredentialPolicy, SasCredential, SasCredentialPolicy,
};
use reqchain_core::{Context, Pipeline};
use std::sync::Arc;

#[tokio::test]
async fn test_key_credential_policy() {
    let transport = Arc::new(ScriptedHttpSend::default());
    let credential = KeyCredential::new("first");
    let policy = KeyCredentialPolicy::new(credential.clone(), "api-key").unwrap();
    let pipeline = Pipeline::new(Context::new().with_http_send(transport.clone())).push(policy);

    pipeline.run(get("https://localhost")).await.unwrap();
    credential.update("second");
    pipeline.run(get("https://localhost")).await.unwrap();

    let requests = transport.requests();
    assert_eq!(requests[0].headers()["api-key"], "first");
    assert_eq!(requests[1].headers()["api-key"], "second");
    assert!(requests[1].headers()["api-key"].is_sensitive());
}

#[tokio::test]
async fn test_key_credential_policy_with_prefix() {
    let transport = Arc::new(ScriptedHttpSend::default());
    let policy = KeyCredentialPolicy::new(KeyCredential::new("secret"), "Authorization")
        .unwrap()
        .with_prefix("SharedAccessKey");
    let pipeline = Pipeline::new(Context::new().with_http_send(transport.clone())).push(policy);

    pipeline.run(get("https://localhost")).await.unwrap();

    assert_eq!(transport.authorizations(), vec!["SharedAccessKey secret"]);
}

#[tokio::test]
async fn test_sas_credential_policy() {
    let transport = Arc::new(ScriptedHttpSend::default());
    let credential = SasCredential::new("?sv=2024&sig=first");
    let pipeline = Pipeline::new(Context::new().with_http_send(transport.clone()))
        .push(SasCredentialPolicy::new(credential.clone()));

    pipeline
        .run(get("https://localhost/container?restype=container"))
        .await
        .unwrap();
    credential.update("sv=2024&sig=second");
    pipeline
        .run(get("https://localhost/container"))
        .await
        .unwrap();

    let uris: Vec<_> = transport
        .requests()
        .iter()
        .map(|r| r.uri().to_string())
        .collect();
    assert_eq!(
        uris,
        vec![
            "https://localhost/container?restype=container&sv=2024&sig=first",
            "https://localhost/container?sv=2024&sig=second",
        ]
    );
}
