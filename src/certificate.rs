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

//! X.509 certificate decoding and classification.
//!
//! EAP-config documents carry CA certificates as base64 DER. This module
//! decodes them into [`Certificate`] values whose CA, self-signed and
//! fingerprint properties are computed once at decode time.
//!
//! # Example
//!
//! ```no_run
//! use eap_wifi_config::certificate::{decode_certificates, format_fingerprint};
//!
//! # fn example(encoded: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
//! let certs = decode_certificates(&encoded)?;
//! for cert in certs.iter().filter(|c| c.is_root_certificate()) {
//!     println!("{} {}", cert.subject(), format_fingerprint(cert.fingerprint()));
//! }
//! # Ok(())
//! # }
//! ```

use std::fmt;

use base64::prelude::*;
use const_oid::db::rfc5280::{ID_CE_BASIC_CONSTRAINTS, ID_CE_KEY_USAGE};
use der::{Decode, Encode};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use x509_cert::ext::pkix::{KeyUsage, KeyUsages};

use crate::error::{EapError, Result};

/// A decoded X.509 certificate with cached classification flags.
///
/// Equality and hashing are defined by the DER encoding; the cached fields
/// are pure functions of it.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Certificate {
    der: Vec<u8>,
    subject: String,
    issuer: String,
    common_name: Option<String>,
    is_ca: bool,
    fingerprint: [u8; 32],
}

impl Certificate {
    /// Decode a certificate from DER bytes.
    ///
    /// # Errors
    ///
    /// [`EapError::InvalidCertificate`] if the bytes are not a certificate,
    /// [`EapError::Toolkit`] if the parsed certificate cannot be re-encoded
    /// for fingerprinting.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let cert = x509_cert::Certificate::from_der(der)
            .map_err(|e| EapError::invalid_certificate(format!("Failed to parse DER: {}", e)))?;

        let fingerprint = compute_fingerprint(&cert)?;
        let tbs = &cert.tbs_certificate;

        Ok(Self {
            der: der.to_vec(),
            subject: tbs.subject.to_string(),
            issuer: tbs.issuer.to_string(),
            common_name: subject_common_name(&cert),
            is_ca: compute_is_ca(&cert),
            fingerprint,
        })
    }

    /// Decode a certificate from base64 DER, ignoring embedded whitespace.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let der = decode_base64(encoded)
            .map_err(|e| EapError::invalid_certificate(format!("Invalid base64: {}", e)))?;
        Self::from_der(&der)
    }

    /// Decode a certificate from PEM text or bare base64.
    ///
    /// Only the first PEM block is used.
    pub fn from_pem_or_base64(text: &str) -> Result<Self> {
        let body: String = text
            .lines()
            .map(str::trim)
            .skip_while(|line| line.starts_with("-----BEGIN") || line.is_empty())
            .take_while(|line| !line.starts_with("-----END"))
            .collect();
        Self::from_base64(&body)
    }

    /// The DER encoding.
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// The DER encoding as standard base64.
    pub fn to_base64(&self) -> String {
        BASE64_STANDARD.encode(&self.der)
    }

    /// Subject distinguished name (RFC 4514 string form).
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Issuer distinguished name (RFC 4514 string form).
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Subject common name, if present.
    pub fn common_name(&self) -> Option<&str> {
        self.common_name.as_deref()
    }

    /// True if the certificate may act as a CA.
    ///
    /// Either the KeyUsage keyCertSign bit or a set Basic Constraints cA
    /// flag is sufficient.
    pub fn is_ca(&self) -> bool {
        self.is_ca
    }

    /// True if issuer and subject are the same name.
    pub fn is_self_signed(&self) -> bool {
        self.issuer == self.subject
    }

    /// True for a self-signed CA certificate (a trust anchor).
    pub fn is_root_certificate(&self) -> bool {
        self.is_self_signed() && self.is_ca
    }

    /// SHA-256 over the DER encoding.
    pub fn fingerprint(&self) -> &[u8; 32] {
        &self.fingerprint
    }

    /// Lowercase hex SHA-256 fingerprint without separators.
    pub fn fingerprint_hex(&self) -> String {
        hex::encode(self.fingerprint)
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("subject", &self.subject)
            .field("issuer", &self.issuer)
            .field("is_ca", &self.is_ca)
            .field("fingerprint", &self.fingerprint_hex())
            .finish()
    }
}

impl Serialize for Certificate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for Certificate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        Certificate::from_base64(&encoded).map_err(de::Error::custom)
    }
}

/// Decode a list of base64 DER certificates.
///
/// Each entry is decoded independently. Malformed entries are dropped with
/// a warning; only toolkit failures abort the whole list.
pub fn decode_certificates<I, S>(encoded: I) -> Result<Vec<Certificate>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut certificates = Vec::new();

    for (index, entry) in encoded.into_iter().enumerate() {
        match Certificate::from_base64(entry.as_ref()) {
            Ok(cert) => {
                debug!("Decoded certificate {}: {}", index, cert.subject());
                certificates.push(cert);
            }
            Err(e @ EapError::Toolkit(_)) => return Err(e),
            Err(e) => warn!("Skipping certificate {}: {}", index, e),
        }
    }

    Ok(certificates)
}

/// Format a fingerprint as a colon-separated hex string.
///
/// Example output: "AB:CD:EF:01:23:45:..."
pub fn format_fingerprint(fp: &[u8; 32]) -> String {
    fp.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(":")
}

/// Parse a fingerprint from a colon-separated (or bare) hex string.
pub fn parse_fingerprint(s: &str) -> Result<[u8; 32]> {
    let cleaned: String = s.chars().filter(|c| *c != ':' && !c.is_whitespace()).collect();
    let bytes = hex::decode(&cleaned)
        .map_err(|e| EapError::invalid_certificate(format!("Invalid fingerprint format: {}", e)))?;

    bytes
        .try_into()
        .map_err(|_| EapError::invalid_certificate("Fingerprint must be 32 bytes (SHA-256)"))
}

pub(crate) fn decode_base64(encoded: &str) -> std::result::Result<Vec<u8>, base64::DecodeError> {
    let cleaned: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    BASE64_STANDARD.decode(cleaned)
}

fn compute_fingerprint(cert: &x509_cert::Certificate) -> Result<[u8; 32]> {
    let der = cert
        .to_der()
        .map_err(|e| EapError::toolkit(format!("Failed to encode certificate: {}", e)))?;

    let mut hasher = Sha256::new();
    hasher.update(&der);
    Ok(hasher.finalize().into())
}

fn compute_is_ca(cert: &x509_cert::Certificate) -> bool {
    let Some(extensions) = &cert.tbs_certificate.extensions else {
        return false;
    };

    let mut key_cert_sign = false;
    let mut basic_constraints_ca = false;

    for ext in extensions.iter() {
        if ext.extn_id == ID_CE_KEY_USAGE {
            match KeyUsage::from_der(ext.extn_value.as_bytes()) {
                Ok(usage) => key_cert_sign = usage.0.contains(KeyUsages::KeyCertSign),
                Err(e) => debug!("Unreadable KeyUsage extension: {}", e),
            }
        } else if ext.extn_id == ID_CE_BASIC_CONSTRAINTS {
            basic_constraints_ca = basic_constraints_ca_flag(ext.extn_value.as_bytes());
        }
    }

    key_cert_sign || basic_constraints_ca
}

/// Reads the cA BOOLEAN straight out of the raw BasicConstraints value.
///
/// The value is `SEQUENCE { cA BOOLEAN DEFAULT FALSE, pathLen INTEGER OPTIONAL }`;
/// an absent BOOLEAN means false.
fn basic_constraints_ca_flag(raw: &[u8]) -> bool {
    const SEQUENCE: u8 = 0x30;
    const BOOLEAN: u8 = 0x01;

    if raw.len() < 2 || raw[0] != SEQUENCE {
        return false;
    }

    // Skip the SEQUENCE header, long-form lengths included.
    let header_len = if raw[1] & 0x80 == 0 {
        2
    } else {
        2 + usize::from(raw[1] & 0x7f)
    };

    match raw.get(header_len..) {
        Some([BOOLEAN, 1, value, ..]) => *value != 0,
        _ => false,
    }
}

fn subject_common_name(cert: &x509_cert::Certificate) -> Option<String> {
    use const_oid::db::rfc4519::CN;

    for rdn in cert.tbs_certificate.subject.0.iter() {
        for atv in rdn.0.iter() {
            if atv.oid == CN {
                if let Ok(s) = std::str::from_utf8(atv.value.value()) {
                    return Some(s.to_string());
                }
            }
        }
    }
    None
}
