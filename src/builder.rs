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

//! Normalization of a parsed document into a [`WifiProfile`].
//!
//! # Example
//!
//! ```no_run
//! use eap_wifi_config::builder::ProfileBuilder;
//! use eap_wifi_config::document::EapDocument;
//!
//! # fn example(bytes: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
//! let document = EapDocument::parse(bytes)?;
//! let profile = ProfileBuilder::new(&document)
//!     .credentials("alice@example.org", "s3cret")
//!     .build()?;
//! println!("{} via {}", profile.provider_id(), profile.eap_method());
//! # Ok(())
//! # }
//! ```

use tracing::{debug, info, warn};

use crate::certificate::{decode_certificates, Certificate};
use crate::credential::extract_client_certificate_base64;
use crate::document::{AuthenticationMethod, ClientSideCredential, EapDocument, IdentityProvider};
use crate::error::{CredentialError, EapError, Result};
use crate::profile::{ClientCredential, EapMethod, Phase2, WifiProfile, WifiProfileParts};
use crate::selector::best_method_with_passphrase;

/// Builder for [`WifiProfile`] from an [`EapDocument`].
///
/// Defaults: first provider, method picked by
/// [`best_method`](crate::selector::best_method), document credentials.
#[derive(Debug, Clone)]
pub struct ProfileBuilder<'a> {
    document: &'a EapDocument,
    provider_id: Option<String>,
    method_index: Option<usize>,
    passphrase: Option<String>,
    credentials: Option<(String, String)>,
}

impl<'a> ProfileBuilder<'a> {
    /// Create a builder over a parsed document.
    pub fn new(document: &'a EapDocument) -> Self {
        Self {
            document,
            provider_id: None,
            method_index: None,
            passphrase: None,
            credentials: None,
        }
    }

    /// Use the provider with this `ID` instead of the first one.
    pub fn provider(mut self, id: impl Into<String>) -> Self {
        self.provider_id = Some(id.into());
        self
    }

    /// Use the method at this index instead of automatic selection.
    pub fn method(mut self, index: usize) -> Self {
        self.method_index = Some(index);
        self
    }

    /// Passphrase for the client certificate container.
    ///
    /// Takes precedence over a passphrase embedded in the document.
    pub fn passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.passphrase = Some(passphrase.into());
        self
    }

    /// User-entered credentials.
    ///
    /// Take precedence over credentials embedded in the document.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    /// Build the profile.
    ///
    /// # Errors
    ///
    /// - [`EapError::ProviderNotFound`] / [`EapError::MethodNotFound`] for
    ///   bad overrides
    /// - [`EapError::MissingField`] when server names, user credentials or a
    ///   required inner method are absent
    /// - [`EapError::MissingClientCertificate`] when a TLS container cannot
    ///   be opened
    /// - [`EapError::UnsupportedEapType`] / [`EapError::UnsupportedPhase2`]
    /// - [`EapError::InvalidProfile`] when the result breaks an invariant
    pub fn build(&self) -> Result<WifiProfile> {
        let provider = self.select_provider()?;
        let method = self.select_method(provider)?;

        debug!(
            "Building profile for provider {} with EAP type {}",
            provider.id, method.eap_type
        );

        let ca_certificates = ca_certificates(method)?;
        let server_names = server_names(method)?;

        let eap_method = EapMethod::from_code(method.eap_type)
            .ok_or(EapError::UnsupportedEapType(method.eap_type))?;

        let empty = ClientSideCredential::default();
        let client = method.client_side_credential.as_ref().unwrap_or(&empty);

        let (client_credential, phase2) = match eap_method {
            EapMethod::Tls => (self.client_certificate(client)?, Phase2::None),
            EapMethod::Peap | EapMethod::Ttls | EapMethod::Pwd => (
                self.username_password(client)?,
                phase2(eap_method, method.inner_method)?,
            ),
        };

        let realm = resolve_realm(client, &client_credential);

        let profile = WifiProfile::new(WifiProfileParts {
            ssids: ssids(provider),
            roaming_consortium_oids: consortium_oids(provider),
            server_names,
            ca_certificates,
            eap_method,
            phase2,
            client_credential,
            anonymous_identity: client.outer_identity.clone(),
            realm,
            display_name: provider.display_name().map(str::to_string),
            provider_id: provider.id.clone(),
            valid_until: provider.valid_until,
        })?;

        info!(
            "Built {} profile for {} ({} SSIDs, {} OIDs)",
            profile.eap_method(),
            profile.provider_id(),
            profile.ssids().len(),
            profile.roaming_consortium_oids().len()
        );
        Ok(profile)
    }

    fn select_provider(&self) -> Result<&'a IdentityProvider> {
        match &self.provider_id {
            Some(id) => self
                .document
                .provider(id)
                .ok_or_else(|| EapError::ProviderNotFound(id.clone())),
            None => self
                .document
                .first_provider()
                .ok_or_else(|| EapError::malformed("Document has no EAPIdentityProvider")),
        }
    }

    fn select_method(&self, provider: &'a IdentityProvider) -> Result<&'a AuthenticationMethod> {
        let methods = &provider.authentication_methods;
        match self.method_index {
            Some(index) => methods.get(index).ok_or(EapError::MethodNotFound {
                index,
                available: methods.len(),
            }),
            None => best_method_with_passphrase(methods, self.passphrase.as_deref())
                .ok_or_else(|| EapError::missing_field("AuthenticationMethod")),
        }
    }

    fn client_certificate(&self, client: &ClientSideCredential) -> Result<ClientCredential> {
        let container = client
            .client_certificate
            .as_deref()
            .ok_or(EapError::MissingClientCertificate(
                CredentialError::NoCertificateFound,
            ))?;

        let passphrase = self.passphrase.as_deref().or(client.passphrase.as_deref());

        match extract_client_certificate_base64(container, passphrase) {
            Ok(cert) => Ok(ClientCredential::ClientCertificate(cert)),
            Err(EapError::Credential(e)) => Err(EapError::MissingClientCertificate(e)),
            Err(e) => Err(e),
        }
    }

    fn username_password(&self, client: &ClientSideCredential) -> Result<ClientCredential> {
        let (username, password) = match &self.credentials {
            Some((username, password)) => (username.clone(), password.clone()),
            None => (
                client
                    .username
                    .clone()
                    .ok_or_else(|| EapError::missing_field("UserName"))?,
                client
                    .password
                    .clone()
                    .ok_or_else(|| EapError::missing_field("Password"))?,
            ),
        };

        if username.trim().is_empty() {
            return Err(EapError::missing_field("UserName"));
        }

        Ok(ClientCredential::UsernamePassword {
            username: qualify_username(username, client),
            password,
        })
    }
}

/// Append the required realm to a bare username.
fn qualify_username(username: String, client: &ClientSideCredential) -> String {
    match &client.inner_identity_suffix {
        Some(suffix) if !client.inner_identity_hint && !username.contains('@') => {
            debug!("Appending required realm {} to username", suffix);
            format!("{}@{}", username, suffix)
        }
        Some(suffix) if !username.ends_with(suffix.as_str()) => {
            warn!("Username does not end with the expected realm {}", suffix);
            username
        }
        _ => username,
    }
}

fn ca_certificates(method: &AuthenticationMethod) -> Result<Vec<Certificate>> {
    let decoded = decode_certificates(method.ca_certificates())?;
    let total = decoded.len();

    let cas: Vec<Certificate> = decoded
        .into_iter()
        .filter(|cert| {
            if !cert.is_ca() {
                warn!("Ignoring non-CA certificate {}", cert.subject());
            }
            cert.is_ca()
        })
        .collect();

    debug!("Kept {} of {} CA certificates", cas.len(), total);
    Ok(cas)
}

fn server_names(method: &AuthenticationMethod) -> Result<Vec<String>> {
    let names: Vec<String> = method
        .server_ids()
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if names.is_empty() {
        return Err(EapError::missing_field("ServerID"));
    }
    Ok(names)
}

fn phase2(eap_method: EapMethod, inner_method: Option<i32>) -> Result<Phase2> {
    match inner_method {
        Some(code) => Phase2::from_code(code).ok_or(EapError::UnsupportedPhase2(code)),
        None if eap_method == EapMethod::Pwd => Ok(Phase2::None),
        None => Err(EapError::missing_field("InnerAuthenticationMethod")),
    }
}

/// Suffix, else the username's domain, else the outer identity's domain.
fn resolve_realm(client: &ClientSideCredential, credential: &ClientCredential) -> Option<String> {
    let username = match credential {
        ClientCredential::UsernamePassword { username, .. } => Some(username.as_str()),
        _ => None,
    };

    client
        .inner_identity_suffix
        .as_deref()
        .filter(|s| !s.is_empty())
        .or_else(|| username.and_then(domain_of))
        .or_else(|| client.outer_identity.as_deref().and_then(domain_of))
        .map(str::to_string)
}

fn domain_of(identity: &str) -> Option<&str> {
    identity
        .rsplit_once('@')
        .map(|(_, domain)| domain)
        .filter(|domain| !domain.is_empty())
}

fn ssids(provider: &IdentityProvider) -> Vec<String> {
    let mut ssids: Vec<String> = Vec::new();
    for ssid in provider.ssids() {
        if !ssids.iter().any(|s| s == ssid) {
            ssids.push(ssid.to_string());
        }
    }
    ssids
}

fn consortium_oids(provider: &IdentityProvider) -> Vec<u64> {
    let mut oids = Vec::new();
    for oid in provider.consortium_oids() {
        match u64::from_str_radix(oid.trim(), 16) {
            Ok(value) if !oids.contains(&value) => oids.push(value),
            Ok(_) => {}
            Err(e) => warn!("Ignoring consortium OID {:?}: {}", oid, e),
        }
    }
    oids
}
