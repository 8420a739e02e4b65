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

//! EAP-config document model and parser.
//!
//! The parser is purely structural. It maps the GEANT eap-metadata schema
//! onto [`EapDocument`] and leaves semantic checks (non-empty server names,
//! usable credentials, supported EAP types) to the profile builder.
//! Optional elements that are absent or unreadable become `None`.
//!
//! # Example
//!
//! ```no_run
//! use eap_wifi_config::document::EapDocument;
//!
//! # fn example(bytes: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
//! let document = EapDocument::parse(bytes)?;
//! for provider in &document.providers {
//!     println!("{}: {} methods", provider.id, provider.authentication_methods.len());
//! }
//! # Ok(())
//! # }
//! ```

mod decode;
mod tree;

use chrono::{DateTime, Utc};

use crate::error::Result;

/// A parsed EAP-config document.
#[derive(Debug, Clone, PartialEq)]
pub struct EapDocument {
    /// Identity providers in document order.
    pub providers: Vec<IdentityProvider>,
}

impl EapDocument {
    /// Parse an EAP-config XML document.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let root = tree::parse(bytes)?;
        decode::document(&root)
    }

    /// The first identity provider, which is the one normally used.
    pub fn first_provider(&self) -> Option<&IdentityProvider> {
        self.providers.first()
    }

    /// Find an identity provider by its `ID` attribute.
    pub fn provider(&self, id: &str) -> Option<&IdentityProvider> {
        self.providers.iter().find(|p| p.id == id)
    }
}

/// One `EAPIdentityProvider` element.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityProvider {
    /// Provider identifier (usually the realm).
    pub id: String,

    /// Identifier namespace, e.g. `urn:RFC4282:realm`.
    pub namespace: Option<String>,

    /// Expiry of this configuration, if stated and readable.
    pub valid_until: Option<DateTime<Utc>>,

    /// Offered authentication methods, in preference order of the producer.
    /// Never empty.
    pub authentication_methods: Vec<AuthenticationMethod>,

    /// Networks the credentials apply to.
    pub credential_applicability: Vec<CredentialApplicability>,

    /// Human-facing provider metadata.
    pub provider_info: Option<ProviderInfo>,
}

impl IdentityProvider {
    /// All SSIDs from every IEEE 802.11 applicability entry.
    pub fn ssids(&self) -> impl Iterator<Item = &str> {
        self.credential_applicability.iter().flat_map(|a| match a {
            CredentialApplicability::Ieee80211 { ssids, .. } => ssids.as_slice(),
            CredentialApplicability::Ieee8023 { .. } => Default::default(),
        })
        .map(String::as_str)
    }

    /// All roaming consortium OIDs (hex strings) from every IEEE 802.11 entry.
    pub fn consortium_oids(&self) -> impl Iterator<Item = &str> {
        self.credential_applicability.iter().flat_map(|a| match a {
            CredentialApplicability::Ieee80211 { consortium_oids, .. } => {
                consortium_oids.as_slice()
            }
            CredentialApplicability::Ieee8023 { .. } => Default::default(),
        })
        .map(String::as_str)
    }

    /// Display name from the provider info, if any.
    pub fn display_name(&self) -> Option<&str> {
        self.provider_info
            .as_ref()
            .and_then(|info| info.display_name.as_deref())
    }
}

/// One `AuthenticationMethod` element.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticationMethod {
    /// Outer EAP type code (13 TLS, 21 TTLS, 25 PEAP, 52 PWD).
    pub eap_type: i32,

    /// Inner method code. Positive values are EAP types, negative values
    /// are negated non-EAP types (PAP is -1).
    pub inner_method: Option<i32>,

    /// How the server is to be authenticated.
    pub server_side_credential: Option<ServerSideCredential>,

    /// What the client authenticates with.
    pub client_side_credential: Option<ClientSideCredential>,
}

impl AuthenticationMethod {
    /// Base64 CA certificates, empty when there is no server credential block.
    pub fn ca_certificates(&self) -> &[String] {
        self.server_side_credential
            .as_ref()
            .map(|s| s.ca_certificates.as_slice())
            .unwrap_or_default()
    }

    /// Server identities, empty when there is no server credential block.
    pub fn server_ids(&self) -> &[String] {
        self.server_side_credential
            .as_ref()
            .map(|s| s.server_ids.as_slice())
            .unwrap_or_default()
    }
}

/// `ServerSideCredential` block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerSideCredential {
    /// Base64 DER CA certificates, undecoded.
    pub ca_certificates: Vec<String>,

    /// Accepted RADIUS server names.
    pub server_ids: Vec<String>,
}

/// `ClientSideCredential` block.
#[derive(Clone, Default, PartialEq)]
pub struct ClientSideCredential {
    /// Outer (anonymous) identity.
    pub outer_identity: Option<String>,

    /// Prefix the inner identity must carry.
    pub inner_identity_prefix: Option<String>,

    /// Realm the inner identity must end with.
    pub inner_identity_suffix: Option<String>,

    /// Whether the suffix is a hint rather than a requirement.
    pub inner_identity_hint: bool,

    /// Pre-provisioned user name.
    pub username: Option<String>,

    /// Pre-provisioned password.
    pub password: Option<String>,

    /// Base64 PKCS#12 client certificate container, undecoded.
    pub client_certificate: Option<String>,

    /// Passphrase for the client certificate container.
    pub passphrase: Option<String>,

    /// Whether the credentials may be stored.
    pub allow_save: Option<bool>,
}

impl std::fmt::Debug for ClientSideCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSideCredential")
            .field("outer_identity", &self.outer_identity)
            .field("inner_identity_prefix", &self.inner_identity_prefix)
            .field("inner_identity_suffix", &self.inner_identity_suffix)
            .field("inner_identity_hint", &self.inner_identity_hint)
            .field("username", &self.username)
            .field("password", &self.password.is_some())
            .field("client_certificate", &self.client_certificate.is_some())
            .field("passphrase", &self.passphrase.is_some())
            .field("allow_save", &self.allow_save)
            .finish()
    }
}

/// One applicability entry.
#[derive(Debug, Clone, PartialEq)]
pub enum CredentialApplicability {
    /// Wireless networks.
    Ieee80211 {
        /// SSIDs.
        ssids: Vec<String>,
        /// Roaming consortium OIDs as hex strings.
        consortium_oids: Vec<String>,
        /// Minimum RSN protocol, e.g. `CCMP`.
        min_rsn_proto: Option<String>,
    },
    /// Wired networks.
    Ieee8023 {
        /// Network identifier.
        network_id: Option<String>,
    },
}

/// `ProviderInfo` block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderInfo {
    /// Institution name.
    pub display_name: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Geographic hints.
    pub locations: Vec<ProviderLocation>,
    /// Institution logo.
    pub logo: Option<ProviderLogo>,
    /// Terms of use text.
    pub terms_of_use: Option<String>,
    /// Helpdesk contact details.
    pub helpdesk: Option<Helpdesk>,
}

/// A geographic coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProviderLocation {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

/// Decoded logo image.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderLogo {
    /// MIME type, e.g. `image/png`.
    pub mime: Option<String>,
    /// Image bytes.
    pub data: Vec<u8>,
}

/// Helpdesk contact details.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Helpdesk {
    /// Email address.
    pub email: Option<String>,
    /// Web address.
    pub web: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
}
