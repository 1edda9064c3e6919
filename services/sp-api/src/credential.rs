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

use std::fmt::Debug;
use std::fmt::Formatter;

use spsign_core::utils::Redact;
use spsign_core::Error;
use spsign_core::Result;

/// Credential that authenticates Selling Partner API requests.
///
/// The signer treats the credential as an opaque input: how it was
/// obtained (and when it must be rotated) is the caller's concern.
#[derive(Default, Clone)]
pub struct Credential {
    /// Access key id of the signing identity.
    pub access_key_id: String,
    /// Secret access key of the signing identity.
    pub secret_access_key: String,
    /// Region the credential scope is bound to, e.g. `us-east-1`.
    pub region: String,
    /// Session token for temporary credentials.
    pub session_token: Option<String>,
}

impl Credential {
    /// Check that every required field is present.
    ///
    /// Called once at signer construction so a misconfigured credential
    /// fails fast instead of at sign time.
    pub fn validate(&self) -> Result<()> {
        if self.access_key_id.is_empty() {
            return Err(Error::config_invalid("access key id is empty"));
        }
        if self.secret_access_key.is_empty() {
            return Err(Error::config_invalid("secret access key is empty"));
        }
        if self.region.is_empty() {
            return Err(Error::config_invalid("region is empty"));
        }

        Ok(())
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_key_id", &Redact::from(&self.access_key_id))
            .field("secret_access_key", &Redact::from(&self.secret_access_key))
            .field("region", &self.region)
            .field("session_token", &Redact::from(&self.session_token))
            .finish()
    }
}
