// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 U.S. Federal Government (in countries where recognized)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Canonical, platform-independent Wi-Fi profile.
//!
//! A [`WifiProfile`] can only exist in a valid state: every construction
//! path, including loading a persisted JSON profile, goes through
//! [`WifiProfile::new`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::certificate::Certificate;
use crate::credential::ClientCertificate;
use crate::error::{EapError, Result};

/// Outer EAP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EapMethod {
    /// EAP-TLS (13).
    Tls,
    /// EAP-TTLS (21).
    Ttls,
    /// PEAP (25).
    Peap,
    /// EAP-pwd (52).
    Pwd,
}

impl EapMethod {
    /// IANA EAP type code.
    pub fn code(&self) -> i32 {
        match self {
            Self::Tls => 13,
            Self::Ttls => 21,
            Self::Peap => 25,
            Self::Pwd => 52,
        }
    }

    /// Map an EAP type code, `None` if unsupported.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            13 => Some(Self::Tls),
            21 => Some(Self::Ttls),
            25 => Some(Self::Peap),
            52 => Some(Self::Pwd),
            _ => None,
        }
    }

    /// Whether this method runs an inner authentication in a TLS tunnel.
    pub fn is_tunnelled(&self) -> bool {
        matches!(self, Self::Ttls | Self::Peap)
    }

    /// Short uppercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tls => "TLS",
            Self::Ttls => "TTLS",
            Self::Peap => "PEAP",
            Self::Pwd => "PWD",
        }
    }
}

impl fmt::Display for EapMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inner (phase 2) authentication.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Phase2 {
    /// No inner authentication.
    #[default]
    None,
    /// PAP (non-EAP 1).
    Pap,
    /// MS-CHAP (non-EAP 2).
    Mschap,
    /// MS-CHAPv2 (non-EAP 3 or EAP 26).
    Mschapv2,
}

impl Phase2 {
    /// Map a signed inner method code.
    ///
    /// Negative codes are non-EAP inner methods, positive codes are EAP
    /// inner methods. MS-CHAPv2 is reachable both as non-EAP 3 (`-3`) and
    /// as EAP-MSCHAPv2 (`26`).
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(Self::Pap),
            -2 => Some(Self::Mschap),
            -3 | 26 => Some(Self::Mschapv2),
            _ => None,
        }
    }

    /// Short uppercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Pap => "PAP",
            Self::Mschap => "MSCHAP",
            Self::Mschapv2 => "MSCHAPV2",
        }
    }
}

impl fmt::Display for Phase2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the client authenticates with.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCredential {
    /// Nothing.
    None,
    /// Inner identity and password.
    UsernamePassword {
        /// Inner identity.
        username: String,
        /// Password.
        password: String,
    },
    /// Private key and certificate chain.
    ClientCertificate(ClientCertificate),
}

impl fmt::Debug for ClientCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::UsernamePassword { username, .. } => f
                .debug_struct("UsernamePassword")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::ClientCertificate(cert) => f.debug_tuple("ClientCertificate").field(cert).finish(),
        }
    }
}

/// Unvalidated profile fields.
///
/// Turned into a [`WifiProfile`] by [`WifiProfile::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiProfileParts {
    /// SSIDs the profile applies to.
    #[serde(default)]
    pub ssids: Vec<String>,
    /// Passpoint roaming consortium OIDs.
    #[serde(default)]
    pub roaming_consortium_oids: Vec<u64>,
    /// Accepted RADIUS server names.
    pub server_names: Vec<String>,
    /// Trusted CA certificates.
    #[serde(default)]
    pub ca_certificates: Vec<Certificate>,
    /// Outer EAP method.
    pub eap_method: EapMethod,
    /// Inner authentication.
    #[serde(default)]
    pub phase2: Phase2,
    /// Client credential.
    pub client_credential: ClientCredential,
    /// Outer (anonymous) identity.
    #[serde(default)]
    pub anonymous_identity: Option<String>,
    /// Realm of the user.
    #[serde(default)]
    pub realm: Option<String>,
    /// Institution name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Identifier of the provider this profile came from.
    pub provider_id: String,
    /// Expiry of the source configuration.
    #[serde(default)]
    pub valid_until: Option<DateTime<Utc>>,
}

/// A validated Wi-Fi enterprise profile.
///
/// Invariants:
/// - `server_names` is non-empty
/// - `ssids` and `roaming_consortium_oids` are not both empty
/// - TLS carries a client certificate, every other method a username and password
/// - PEAP and TTLS carry a phase 2 method, TLS carries none
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WifiProfileParts")]
pub struct WifiProfile {
    ssids: Vec<String>,
    roaming_consortium_oids: Vec<u64>,
    server_names: Vec<String>,
    ca_certificates: Vec<Certificate>,
    eap_method: EapMethod,
    phase2: Phase2,
    client_credential: ClientCredential,
    anonymous_identity: Option<String>,
    realm: Option<String>,
    display_name: Option<String>,
    provider_id: String,
    valid_until: Option<DateTime<Utc>>,
}

impl TryFrom<WifiProfileParts> for WifiProfile {
    type Error = EapError;

    fn try_from(parts: WifiProfileParts) -> Result<Self> {
        Self::new(parts)
    }
}

impl From<WifiProfile> for WifiProfileParts {
    fn from(p: WifiProfile) -> Self {
        Self {
            ssids: p.ssids,
            roaming_consortium_oids: p.roaming_consortium_oids,
            server_names: p.server_names,
            ca_certificates: p.ca_certificates,
            eap_method: p.eap_method,
            phase2: p.phase2,
            client_credential: p.client_credential,
            anonymous_identity: p.anonymous_identity,
            realm: p.realm,
            display_name: p.display_name,
            provider_id: p.provider_id,
            valid_until: p.valid_until,
        }
    }
}

impl WifiProfile {
    /// Validate `parts` into a profile.
    ///
    /// # Errors
    ///
    /// [`EapError::InvalidProfile`] naming the first violated invariant.
    pub fn new(parts: WifiProfileParts) -> Result<Self> {
        validate(&parts)?;

        Ok(Self {
            ssids: parts.ssids,
            roaming_consortium_oids: parts.roaming_consortium_oids,
            server_names: parts.server_names,
            ca_certificates: parts.ca_certificates,
            eap_method: parts.eap_method,
            phase2: parts.phase2,
            client_credential: parts.client_credential,
            anonymous_identity: parts.anonymous_identity,
            realm: parts.realm,
            display_name: parts.display_name,
            provider_id: parts.provider_id,
            valid_until: parts.valid_until,
        })
    }

    /// SSIDs the profile applies to.
    pub fn ssids(&self) -> &[String] {
        &self.ssids
    }

    /// Passpoint roaming consortium OIDs.
    pub fn roaming_consortium_oids(&self) -> &[u64] {
        &self.roaming_consortium_oids
    }

    /// Accepted RADIUS server names, never empty.
    pub fn server_names(&self) -> &[String] {
        &self.server_names
    }

    /// Trusted CA certificates.
    pub fn ca_certificates(&self) -> &[Certificate] {
        &self.ca_certificates
    }

    /// Trusted CA certificates that are self-signed roots.
    pub fn root_certificates(&self) -> impl Iterator<Item = &Certificate> {
        self.ca_certificates
            .iter()
            .filter(|c| c.is_root_certificate())
    }

    /// Outer EAP method.
    pub fn eap_method(&self) -> EapMethod {
        self.eap_method
    }

    /// Inner authentication.
    pub fn phase2(&self) -> Phase2 {
        self.phase2
    }

    /// Client credential.
    pub fn client_credential(&self) -> &ClientCredential {
        &self.client_credential
    }

    /// Outer (anonymous) identity.
    pub fn anonymous_identity(&self) -> Option<&str> {
        self.anonymous_identity.as_deref()
    }

    /// Realm of the user.
    pub fn realm(&self) -> Option<&str> {
        self.realm.as_deref()
    }

    /// Institution name.
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Identifier of the provider this profile came from.
    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    /// Expiry of the source configuration.
    pub fn valid_until(&self) -> Option<DateTime<Utc>> {
        self.valid_until
    }

    /// Whether the source configuration has expired at `now`.
    ///
    /// Profiles without an expiry never expire.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.valid_until.is_some_and(|until| now >= until)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a profile persisted with [`WifiProfile::to_json`].
    ///
    /// # Errors
    ///
    /// [`EapError::Serialization`] for unreadable JSON,
    /// [`EapError::InvalidProfile`] if the stored profile breaks an invariant.
    pub fn from_json(json: &str) -> Result<Self> {
        let parts: WifiProfileParts = serde_json::from_str(json)?;
        Self::new(parts)
    }
}

fn validate(parts: &WifiProfileParts) -> Result<()> {
    if parts.server_names.iter().all(|s| s.trim().is_empty()) {
        return Err(EapError::invalid_profile("no server names"));
    }

    if parts.ssids.is_empty() && parts.roaming_consortium_oids.is_empty() {
        return Err(EapError::invalid_profile(
            "neither SSIDs nor roaming consortium OIDs",
        ));
    }

    match (&parts.eap_method, &parts.client_credential) {
        (EapMethod::Tls, ClientCredential::ClientCertificate(_)) => {}
        (EapMethod::Tls, _) => {
            return Err(EapError::invalid_profile(
                "TLS requires a client certificate",
            ))
        }
        (_, ClientCredential::UsernamePassword { username, .. }) if username.is_empty() => {
            return Err(EapError::invalid_profile("empty username"))
        }
        (_, ClientCredential::UsernamePassword { .. }) => {}
        (method, _) => {
            return Err(EapError::invalid_profile(format!(
                "{} requires a username and password",
                method
            )))
        }
    }

    match (parts.eap_method, parts.phase2) {
        (EapMethod::Tls, Phase2::None) => {}
        (EapMethod::Tls, phase2) => {
            return Err(EapError::invalid_profile(format!(
                "TLS cannot carry phase 2 {}",
                phase2
            )))
        }
        (method, Phase2::None) if method.is_tunnelled() => {
            return Err(EapError::invalid_profile(format!(
                "{} requires a phase 2 method",
                method
            )))
        }
        _ => {}
    }

    Ok(())
}
