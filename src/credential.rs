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

//! Client certificate extraction from PKCS#12 containers.
//!
//! EAP-TLS methods ship the user's certificate and private key as a
//! base64 PKCS#12 blob, optionally protected by a passphrase that is either
//! embedded in the document or typed in by the user.

use std::fmt;

use base64::prelude::*;
use openssl::pkcs12::Pkcs12;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, warn};

use crate::certificate::{decode_base64, Certificate};
use crate::error::{CredentialError, EapError, Result};

/// A private key in PKCS#8 DER form.
///
/// The key material is never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey {
    pkcs8_der: Vec<u8>,
}

impl PrivateKey {
    /// Wrap PKCS#8 DER bytes.
    pub fn from_pkcs8_der(der: impl Into<Vec<u8>>) -> Self {
        Self {
            pkcs8_der: der.into(),
        }
    }

    /// The PKCS#8 DER encoding.
    pub fn pkcs8_der(&self) -> &[u8] {
        &self.pkcs8_der
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("len", &self.pkcs8_der.len())
            .finish_non_exhaustive()
    }
}

impl Serialize for PrivateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64_STANDARD.encode(&self.pkcs8_der))
    }
}

impl<'de> Deserialize<'de> for PrivateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        let der = BASE64_STANDARD.decode(encoded).map_err(de::Error::custom)?;
        Ok(Self::from_pkcs8_der(der))
    }
}

/// A private key together with its certificate chain, leaf first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ClientCertificateParts")]
pub struct ClientCertificate {
    private_key: PrivateKey,
    chain: Vec<Certificate>,
}

#[derive(Deserialize)]
struct ClientCertificateParts {
    private_key: PrivateKey,
    chain: Vec<Certificate>,
}

impl TryFrom<ClientCertificateParts> for ClientCertificate {
    type Error = EapError;

    fn try_from(parts: ClientCertificateParts) -> Result<Self> {
        Self::new(parts.private_key, parts.chain)
    }
}

impl ClientCertificate {
    /// Create a client certificate from a key and a non-empty chain.
    pub fn new(private_key: PrivateKey, chain: Vec<Certificate>) -> Result<Self> {
        if chain.is_empty() {
            return Err(CredentialError::NoCertificateFound.into());
        }
        Ok(Self { private_key, chain })
    }

    /// The private key.
    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    /// The certificate chain, leaf first.
    pub fn chain(&self) -> &[Certificate] {
        &self.chain
    }

    /// The leaf (end-entity) certificate.
    pub fn leaf(&self) -> &Certificate {
        // The constructor guarantees a non-empty chain.
        &self.chain[0]
    }
}

/// Open a PKCS#12 container and extract the client key and chain.
///
/// A missing passphrase is treated as the empty string.
///
/// # Errors
///
/// - [`CredentialError::WrongPassphraseOrCorrupt`] if the container cannot
///   be decoded or its MAC does not verify with `passphrase`.
/// - [`CredentialError::NoCertificateFound`] if no entry pairs a private key
///   with a certificate.
/// - [`EapError::Toolkit`] if extracted material cannot be re-encoded.
pub fn extract_client_certificate(
    container: &[u8],
    passphrase: Option<&str>,
) -> Result<ClientCertificate> {
    let pkcs12 = Pkcs12::from_der(container).map_err(|e| {
        debug!("PKCS#12 decode failed: {}", e);
        CredentialError::WrongPassphraseOrCorrupt
    })?;

    let parsed = pkcs12.parse2(passphrase.unwrap_or("")).map_err(|e| {
        debug!("PKCS#12 open failed: {}", e);
        CredentialError::WrongPassphraseOrCorrupt
    })?;

    let (Some(pkey), Some(leaf)) = (parsed.pkey, parsed.cert) else {
        return Err(CredentialError::NoCertificateFound.into());
    };

    let private_key = pkey
        .private_key_to_pkcs8()
        .map_err(|e| EapError::toolkit(format!("Failed to encode private key: {}", e)))?;

    let leaf_der = leaf
        .to_der()
        .map_err(|e| EapError::toolkit(format!("Failed to encode certificate: {}", e)))?;
    let leaf = Certificate::from_der(&leaf_der).map_err(|e| match e {
        EapError::Toolkit(_) => e,
        _ => CredentialError::NoCertificateFound.into(),
    })?;

    let mut chain = vec![leaf];
    for extra in parsed.ca.iter().flatten() {
        let der = extra
            .to_der()
            .map_err(|e| EapError::toolkit(format!("Failed to encode certificate: {}", e)))?;
        match Certificate::from_der(&der) {
            Ok(cert) => chain.push(cert),
            Err(e @ EapError::Toolkit(_)) => return Err(e),
            Err(e) => warn!("Skipping chain certificate: {}", e),
        }
    }

    debug!(
        "Extracted client certificate {} with chain of {}",
        chain[0].subject(),
        chain.len()
    );

    ClientCertificate::new(PrivateKey::from_pkcs8_der(private_key), chain)
}

/// Like [`extract_client_certificate`], for a base64-encoded container.
pub fn extract_client_certificate_base64(
    encoded: &str,
    passphrase: Option<&str>,
) -> Result<ClientCertificate> {
    let container = decode_base64(encoded).map_err(|e| {
        debug!("Client certificate is not valid base64: {}", e);
        CredentialError::WrongPassphraseOrCorrupt
    })?;
    extract_client_certificate(&container, passphrase)
}
