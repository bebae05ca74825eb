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

use crate::time::{self, DateTime};
use crate::utils::Redact;
use crate::Result;
use std::fmt::{Debug, Formatter};
use std::time::Duration;

/// Tokens expiring within this window are refreshed before use.
pub const REFRESH_SKEW: Duration = Duration::from_secs(300);

/// Token is an opaque bearer token with an absolute expiry.
///
/// Tokens are immutable: a refresh replaces the cached token instead of
/// updating it.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    value: String,
    expires_on: DateTime,
    refresh_on: Option<DateTime>,
}

impl Debug for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("value", &Redact::from(&self.value))
            .field("expires_on", &self.expires_on)
            .field("refresh_on", &self.refresh_on)
            .finish()
    }
}

impl Token {
    /// Create a new token expiring at `expires_on`.
    pub fn new(value: impl Into<String>, expires_on: DateTime) -> Self {
        Self {
            value: value.into(),
            expires_on,
            refresh_on: None,
        }
    }

    /// Create a new token expiring `expires_in` from now.
    pub fn expires_in(value: impl Into<String>, expires_in: Duration) -> Self {
        Self::new(value, time::now() + time::delta(expires_in))
    }

    /// Adapt a token expressed with unix timestamps (seconds), as most token
    /// endpoints return them.
    pub fn from_unix_timestamp(
        value: impl Into<String>,
        expires_on: i64,
        refresh_on: Option<i64>,
    ) -> Result<Self> {
        let mut token = Self::new(value, time::from_unix_timestamp(expires_on)?);
        if let Some(refresh_on) = refresh_on {
            token.refresh_on = Some(time::from_unix_timestamp(refresh_on)?);
        }
        Ok(token)
    }

    /// Set the instant at which the issuer asks for a proactive refresh.
    pub fn with_refresh_on(mut self, refresh_on: DateTime) -> Self {
        self.refresh_on = Some(refresh_on);
        self
    }

    /// The bearer value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The absolute expiry.
    pub fn expires_on(&self) -> DateTime {
        self.expires_on
    }

    /// The absolute refresh hint, if the issuer sent one.
    pub fn refresh_on(&self) -> Option<DateTime> {
        self.refresh_on
    }

    /// Check whether this token must be replaced before use at `now`.
    ///
    /// A token needs refresh when it expires within [`REFRESH_SKEW`], or when
    /// its refresh hint has passed.
    pub fn needs_refresh_at(&self, now: DateTime) -> bool {
        if self.expires_on <= now + time::delta(REFRESH_SKEW) {
            return true;
        }

        self.refresh_on.is_some_and(|refresh_on| refresh_on <= now)
    }

    /// Check whether this token must be replaced before use right now.
    pub fn needs_refresh(&self) -> bool {
        self.needs_refresh_at(time::now())
    }
}

/// Options passed to the credential for a single token request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenRequestOptions {
    /// Additional claims required in the token, as a decoded JSON document.
    ///
    /// Usually taken from a claims challenge sent by the service.
    pub claims: Option<String>,
    /// Request a token that supports continuous access evaluation.
    pub enable_cae: bool,
    /// Tenant to request the token for, when the credential supports it.
    pub tenant_id: Option<String>,
}

impl TokenRequestOptions {
    /// Set the claims to request.
    pub fn with_claims(mut self, claims: impl Into<String>) -> Self {
        self.claims = Some(claims.into());
        self
    }

    /// Enable or disable continuous access evaluation.
    pub fn with_enable_cae(mut self, enable_cae: bool) -> Self {
        self.enable_cae = enable_cae;
        self
    }

    /// Set the tenant to request the token for.
    pub fn with_tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }
}
