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

use reqchain_core::{Context, Error, RequestContext, Result};
use std::str::FromStr;
use std::time::Duration;

/// Application id prefixed to the user agent.
pub const REQCHAIN_APPLICATION_ID: &str = "REQCHAIN_APPLICATION_ID";
/// Suffix appended to the user agent.
pub const REQCHAIN_HTTP_USER_AGENT: &str = "REQCHAIN_HTTP_USER_AGENT";
/// Redirects followed per call.
pub const REQCHAIN_MAX_REDIRECTS: &str = "REQCHAIN_MAX_REDIRECTS";
/// Keep credentials on requests redirected to another origin.
pub const REQCHAIN_DISABLE_REDIRECT_CLEANUP: &str = "REQCHAIN_DISABLE_REDIRECT_CLEANUP";
/// Ask for tokens supporting continuous access evaluation.
pub const REQCHAIN_ENABLE_CAE: &str = "REQCHAIN_ENABLE_CAE";
/// Deadline of every call, in seconds.
pub const REQCHAIN_TIMEOUT: &str = "REQCHAIN_TIMEOUT";

/// Config carries the settings of a default pipeline.
///
/// Unset fields use the defaults of each policy.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Config {
    /// `application_id` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`REQCHAIN_APPLICATION_ID`]
    pub application_id: Option<String>,
    /// `user_agent_suffix` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`REQCHAIN_HTTP_USER_AGENT`]
    pub user_agent_suffix: Option<String>,
    /// `max_redirects` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`REQCHAIN_MAX_REDIRECTS`]
    ///
    /// Defaults to 30.
    pub max_redirects: Option<usize>,
    /// `disable_redirect_cleanup` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`REQCHAIN_DISABLE_REDIRECT_CLEANUP`]
    pub disable_redirect_cleanup: Option<bool>,
    /// `enable_cae` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`REQCHAIN_ENABLE_CAE`]
    pub enable_cae: Option<bool>,
    /// `timeout` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`REQCHAIN_TIMEOUT`], in seconds
    pub timeout: Option<Duration>,
}

impl Config {
    /// Load unset fields from env.
    ///
    /// Fails with [`ErrorKind::ConfigInvalid`](reqchain_core::ErrorKind::ConfigInvalid)
    /// if a numeric or boolean variable cannot be parsed.
    pub fn from_env(mut self, ctx: &Context) -> Result<Self> {
        if self.application_id.is_none() {
            self.application_id = ctx.env_var(REQCHAIN_APPLICATION_ID);
        }
        if self.user_agent_suffix.is_none() {
            self.user_agent_suffix = ctx.env_var(REQCHAIN_HTTP_USER_AGENT);
        }
        if self.max_redirects.is_none() {
            self.max_redirects = parse_env(ctx, REQCHAIN_MAX_REDIRECTS)?;
        }
        if self.disable_redirect_cleanup.is_none() {
            self.disable_redirect_cleanup = parse_bool_env(ctx, REQCHAIN_DISABLE_REDIRECT_CLEANUP)?;
        }
        if self.enable_cae.is_none() {
            self.enable_cae = parse_bool_env(ctx, REQCHAIN_ENABLE_CAE)?;
        }
        if self.timeout.is_none() {
            self.timeout = parse_env::<u64>(ctx, REQCHAIN_TIMEOUT)?.map(Duration::from_secs);
        }

        Ok(self)
    }

    /// Build the per-call context carrying the configured deadline.
    pub fn request_context(&self) -> RequestContext {
        let ctx = RequestContext::default();
        match self.timeout {
            Some(timeout) => ctx.with_timeout(timeout),
            None => ctx,
        }
    }
}

fn parse_env<T: FromStr>(ctx: &Context, key: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    let Some(v) = ctx.env_var(key) else {
        return Ok(None);
    };

    v.trim()
        .parse()
        .map(Some)
        .map_err(|e| Error::config_invalid(format!("invalid value {v:?} for {key}: {e}")))
}

fn parse_bool_env(ctx: &Context, key: &str) -> Result<Option<bool>> {
    let Some(v) = ctx.env_var(key) else {
        return Ok(None);
    };

    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" | "" => Ok(Some(false)),
        _ => Err(Error::config_invalid(format!(
            "invalid value {v:?} for {key}: expected a boolean"
        ))),
    }
}
