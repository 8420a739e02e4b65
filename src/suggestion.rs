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

//! Derivation of installable network descriptors from a [`WifiProfile`].
//!
//! SSID suggestions are always produced. A roaming (Passpoint) suggestion
//! is produced only when the profile and the platform both allow it;
//! anything that rules it out is logged, not returned as an error.

use std::fmt;
use std::sync::Arc;

use base64::prelude::*;
use tracing::{debug, info, warn};

use crate::certificate::Certificate;
use crate::credential::{ClientCertificate, PrivateKey};
use crate::profile::{ClientCredential, EapMethod, Phase2, WifiProfile};

/// What the target platform can express.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformCapabilities {
    /// Server name matching accepts a `;`-separated list of names.
    /// Otherwise only a single domain suffix can be given.
    pub multi_suffix_server_names: bool,

    /// Passpoint roaming profiles can be installed.
    pub supports_roaming: bool,
}

impl Default for PlatformCapabilities {
    fn default() -> Self {
        Self {
            multi_suffix_server_names: true,
            supports_roaming: true,
        }
    }
}

/// Enterprise (802.1X) settings shared by every SSID suggestion.
#[derive(Clone, PartialEq, Eq)]
pub struct EnterpriseParameters {
    /// Outer EAP method.
    pub eap_method: EapMethod,
    /// Inner authentication.
    pub phase2: Phase2,
    /// Identity presented to the server.
    pub identity: Option<String>,
    /// Outer identity for tunnelled methods.
    pub anonymous_identity: Option<String>,
    /// Password for password-based methods.
    pub password: Option<String>,
    /// Key and chain for TLS.
    pub client_certificate: Option<ClientCertificate>,
    /// Trusted CA certificates.
    pub ca_certificates: Vec<Certificate>,
    /// Server name constraint in the platform's syntax.
    pub server_name_match: String,
    /// Realm of the user.
    pub realm: Option<String>,
}

impl fmt::Debug for EnterpriseParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnterpriseParameters")
            .field("eap_method", &self.eap_method)
            .field("phase2", &self.phase2)
            .field("identity", &self.identity)
            .field("anonymous_identity", &self.anonymous_identity)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("client_certificate", &self.client_certificate)
            .field("ca_certificates", &self.ca_certificates.len())
            .field("server_name_match", &self.server_name_match)
            .field("realm", &self.realm)
            .finish()
    }
}

/// A network suggestion for one SSID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsidSuggestion {
    /// Network name.
    pub ssid: String,
    /// Enterprise settings, shared between all SSIDs of a profile.
    pub enterprise: Arc<EnterpriseParameters>,
}

/// Credential of a roaming suggestion.
#[derive(Clone, PartialEq, Eq)]
pub enum RoamingCredential {
    /// EAP-TLS with the profile's client certificate.
    Certificate {
        /// SHA-256 fingerprint of the leaf certificate.
        fingerprint: [u8; 32],
        /// Private key.
        private_key: PrivateKey,
        /// Chain, leaf first.
        chain: Vec<Certificate>,
    },
    /// EAP-TTLS with a username and password.
    UsernamePassword {
        /// Inner identity.
        username: String,
        /// Password, base64 encoded.
        password_base64: String,
        /// Outer EAP type, always TTLS.
        eap_type: i32,
        /// Inner authentication.
        phase2: Phase2,
    },
}

impl fmt::Debug for RoamingCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Certificate {
                fingerprint, chain, ..
            } => f
                .debug_struct("Certificate")
                .field("fingerprint", &hex::encode(fingerprint))
                .field("chain", &chain.len())
                .finish_non_exhaustive(),
            Self::UsernamePassword {
                username,
                eap_type,
                phase2,
                ..
            } => f
                .debug_struct("UsernamePassword")
                .field("username", username)
                .field("eap_type", eap_type)
                .field("phase2", phase2)
                .finish_non_exhaustive(),
        }
    }
}

/// A Passpoint suggestion, identified by realm and consortium OIDs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoamingSuggestion {
    /// Home realm.
    pub realm: String,
    /// The single trusted root.
    pub root_ca: Certificate,
    /// Client credential.
    pub credential: RoamingCredential,
    /// Name shown to the user.
    pub friendly_name: String,
    /// Roaming consortium OIDs.
    pub roaming_consortium_oids: Vec<u64>,
}

/// One SSID suggestion per profile SSID, sharing one set of enterprise
/// parameters.
pub fn derive_ssid_suggestions(
    profile: &WifiProfile,
    capabilities: &PlatformCapabilities,
) -> Vec<SsidSuggestion> {
    if profile.ssids().is_empty() {
        debug!("Profile has no SSIDs");
        return Vec::new();
    }

    let enterprise = Arc::new(enterprise_parameters(profile, capabilities));

    profile
        .ssids()
        .iter()
        .map(|ssid| SsidSuggestion {
            ssid: ssid.clone(),
            enterprise: Arc::clone(&enterprise),
        })
        .collect()
}

/// Enterprise settings for `profile` on a platform with `capabilities`.
pub fn enterprise_parameters(
    profile: &WifiProfile,
    capabilities: &PlatformCapabilities,
) -> EnterpriseParameters {
    let server_name_match =
        server_name_match(profile.server_names(), capabilities.multi_suffix_server_names);
    if server_name_match.is_empty() {
        warn!(
            "Server names {:?} share no common suffix, server name is not checked",
            profile.server_names()
        );
    }

    let (identity, anonymous_identity, password, client_certificate) =
        match profile.client_credential() {
            ClientCredential::ClientCertificate(cert) => (
                profile.anonymous_identity().map(str::to_string),
                None,
                None,
                Some(cert.clone()),
            ),
            ClientCredential::UsernamePassword { username, password } => (
                Some(username.clone()),
                profile.anonymous_identity().map(str::to_string),
                Some(password.clone()),
                None,
            ),
            ClientCredential::None => (None, None, None, None),
        };

    EnterpriseParameters {
        eap_method: profile.eap_method(),
        phase2: profile.phase2(),
        identity,
        anonymous_identity,
        password,
        client_certificate,
        ca_certificates: profile.ca_certificates().to_vec(),
        server_name_match,
        realm: profile.realm().map(str::to_string),
    }
}

/// A Passpoint suggestion, or `None` when the profile or platform rules
/// one out.
pub fn derive_roaming_suggestion(
    profile: &WifiProfile,
    capabilities: &PlatformCapabilities,
) -> Option<RoamingSuggestion> {
    if profile.roaming_consortium_oids().is_empty() {
        debug!("No roaming consortium OIDs, skipping roaming suggestion");
        return None;
    }

    if !capabilities.supports_roaming {
        info!("Platform does not support roaming profiles");
        return None;
    }

    let Some(realm) = profile.realm() else {
        warn!("No realm known, cannot build a roaming suggestion");
        return None;
    };

    let roots: Vec<&Certificate> = profile.root_certificates().collect();
    let [root_ca] = roots.as_slice() else {
        warn!(
            "Roaming suggestion needs exactly one root CA, profile has {}",
            roots.len()
        );
        return None;
    };

    let credential = match (profile.eap_method(), profile.client_credential()) {
        (EapMethod::Pwd, _) => {
            info!("EAP-pwd cannot be used for roaming");
            return None;
        }
        (EapMethod::Tls, ClientCredential::ClientCertificate(cert)) => {
            RoamingCredential::Certificate {
                fingerprint: *cert.leaf().fingerprint(),
                private_key: cert.private_key().clone(),
                chain: cert.chain().to_vec(),
            }
        }
        (
            EapMethod::Peap | EapMethod::Ttls,
            ClientCredential::UsernamePassword { username, password },
        ) => RoamingCredential::UsernamePassword {
            username: username.clone(),
            password_base64: BASE64_STANDARD.encode(password),
            eap_type: EapMethod::Ttls.code(),
            phase2: profile.phase2(),
        },
        (method, _) => {
            warn!("No roaming credential for {}", method);
            return None;
        }
    };

    let friendly_name = profile.display_name().unwrap_or(realm).to_string();
    debug!("Roaming suggestion for realm {} ({})", realm, friendly_name);

    Some(RoamingSuggestion {
        realm: realm.to_string(),
        root_ca: (*root_ca).clone(),
        credential,
        friendly_name,
        roaming_consortium_oids: profile.roaming_consortium_oids().to_vec(),
    })
}

/// Server name constraint for a platform.
///
/// With multi-suffix support the names are joined with `;`, otherwise the
/// names are reduced to their longest common domain suffix.
pub fn server_name_match<S: AsRef<str>>(names: &[S], multi_suffix: bool) -> String {
    if multi_suffix {
        names
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(";")
    } else {
        longest_common_suffix(names)
    }
}

/// Longest suffix shared by all strings, cut at label boundaries of each
/// candidate.
///
/// `["radius.example.org", "aaa.example.org"]` gives `"example.org"`.
/// Returns `""` for an empty list or when nothing is shared.
pub fn longest_common_suffix<S: AsRef<str>>(strings: &[S]) -> String {
    let Some((first, rest)) = strings.split_first() else {
        return String::new();
    };

    let mut longest = first.as_ref();
    for candidate in rest {
        let mut candidate = candidate.as_ref();
        while !longest.ends_with(candidate) {
            candidate = match candidate.split_once('.') {
                Some((_, tail)) => tail,
                None => "",
            };
        }
        longest = candidate;
    }

    longest.to_string()
}
