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

//! Mapping from the XML element tree onto the document model.
//!
//! One function per schema element. Required-vs-optional decisions live
//! here and nowhere else.

use base64::prelude::*;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use tracing::{debug, warn};

use super::tree::Element;
use super::{
    AuthenticationMethod, ClientSideCredential, CredentialApplicability, EapDocument, Helpdesk,
    IdentityProvider, ProviderInfo, ProviderLocation, ProviderLogo, ServerSideCredential,
};
use crate::error::{EapError, Result};

/// `ValidUntil` timestamps are UTC in this format.
const VALID_UNTIL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub(super) fn document(root: &Element) -> Result<EapDocument> {
    let providers = match root.name.as_str() {
        "EAPIdentityProviderList" => root
            .children_named("EAPIdentityProvider")
            .map(identity_provider)
            .collect::<Result<Vec<_>>>()?,
        "EAPIdentityProvider" => vec![identity_provider(root)?],
        other => {
            return Err(EapError::malformed(format!(
                "Unexpected root element <{}>",
                other
            )))
        }
    };

    if providers.is_empty() {
        return Err(EapError::malformed("Document has no EAPIdentityProvider"));
    }

    debug!("Parsed EAP-config document with {} providers", providers.len());
    Ok(EapDocument { providers })
}

fn identity_provider(el: &Element) -> Result<IdentityProvider> {
    let methods = el
        .child("AuthenticationMethods")
        .ok_or_else(|| EapError::malformed("EAPIdentityProvider without AuthenticationMethods"))?;

    let authentication_methods = methods
        .children_named("AuthenticationMethod")
        .map(authentication_method)
        .collect::<Result<Vec<_>>>()?;

    if authentication_methods.is_empty() {
        return Err(EapError::malformed(
            "AuthenticationMethods contains no AuthenticationMethod",
        ));
    }

    Ok(IdentityProvider {
        id: el.attr("ID").unwrap_or_default().to_string(),
        namespace: el.attr("namespace").map(str::to_string),
        valid_until: el.child_text("ValidUntil").and_then(|s| valid_until(&s)),
        authentication_methods,
        credential_applicability: el
            .child("CredentialApplicability")
            .map(credential_applicability)
            .unwrap_or_default(),
        provider_info: el.child("ProviderInfo").map(provider_info),
    })
}

fn authentication_method(el: &Element) -> Result<AuthenticationMethod> {
    let eap_method = el
        .child("EAPMethod")
        .ok_or_else(|| EapError::malformed("AuthenticationMethod without EAPMethod"))?;

    let inner_method = match el.child("InnerAuthenticationMethod") {
        Some(inner) => inner_method(inner)?,
        None => None,
    };

    Ok(AuthenticationMethod {
        eap_type: type_code(eap_method)?,
        inner_method,
        server_side_credential: single(el, "ServerSideCredential").map(server_side_credential),
        client_side_credential: single(el, "ClientSideCredential").map(client_side_credential),
    })
}

/// EAP inner methods keep their code; non-EAP inner methods are negated.
fn inner_method(el: &Element) -> Result<Option<i32>> {
    if let Some(eap) = el.child("EAPMethod") {
        return type_code(eap).map(Some);
    }
    if let Some(non_eap) = el.child("NonEAPAuthMethod") {
        return type_code(non_eap).map(|code| Some(-code));
    }
    Ok(None)
}

fn type_code(el: &Element) -> Result<i32> {
    let text = el
        .child_text("Type")
        .ok_or_else(|| EapError::malformed(format!("<{}> without <Type>", el.name)))?;

    text.parse().map_err(|_| {
        EapError::malformed(format!("Non-numeric <Type> in <{}>: {}", el.name, text))
    })
}

fn single<'a>(el: &'a Element, name: &'a str) -> Option<&'a Element> {
    let mut matches = el.children_named(name);
    let first = matches.next();
    if matches.next().is_some() {
        warn!("Multiple <{}> blocks, using the first", name);
    }
    first
}

fn server_side_credential(el: &Element) -> ServerSideCredential {
    let ca_certificates = el
        .children_named("CA")
        .filter(|ca| match ca.attr("format") {
            None | Some("X.509") => true,
            Some(other) => {
                warn!("Ignoring CA in unsupported format {}", other);
                false
            }
        })
        .filter_map(Element::text)
        .map(str::to_string)
        .collect();

    ServerSideCredential {
        ca_certificates,
        server_ids: texts(el, "ServerID"),
    }
}

fn client_side_credential(el: &Element) -> ClientSideCredential {
    ClientSideCredential {
        outer_identity: el.child_text("OuterIdentity"),
        inner_identity_prefix: el.child_text("InnerIdentityPrefix"),
        inner_identity_suffix: el.child_text("InnerIdentitySuffix"),
        inner_identity_hint: el
            .child_text("InnerIdentityHint")
            .and_then(|s| boolean(&s))
            .unwrap_or(false),
        username: el.child_text("UserName"),
        password: el.child_text("Password"),
        client_certificate: el.child_text("ClientCertificate"),
        passphrase: el.child_text("Passphrase"),
        allow_save: el.attr("allow_save").and_then(boolean),
    }
}

fn credential_applicability(el: &Element) -> Vec<CredentialApplicability> {
    let mut entries = Vec::new();

    for child in &el.children {
        match child.name.as_str() {
            "IEEE80211" => entries.push(CredentialApplicability::Ieee80211 {
                ssids: texts(child, "SSID"),
                consortium_oids: texts(child, "ConsortiumOID"),
                min_rsn_proto: child.child_text("MinRSNProto"),
            }),
            "IEEE8023" => entries.push(CredentialApplicability::Ieee8023 {
                network_id: child.child_text("NetworkID"),
            }),
            other => debug!("Ignoring applicability entry <{}>", other),
        }
    }

    entries
}

fn provider_info(el: &Element) -> ProviderInfo {
    ProviderInfo {
        display_name: localized(el, "DisplayName"),
        description: localized(el, "Description"),
        locations: el.children_named("ProviderLocation").filter_map(location).collect(),
        logo: el.child("ProviderLogo").and_then(logo),
        terms_of_use: localized(el, "TermsOfUse"),
        helpdesk: el.child("Helpdesk").map(|h| Helpdesk {
            email: localized(h, "EmailAddress"),
            web: localized(h, "WebAddress"),
            phone: localized(h, "Phone"),
        }),
    }
}

/// Prefers an English or language-neutral variant, else the first one.
fn localized(el: &Element, name: &str) -> Option<String> {
    let candidates: Vec<&Element> = el
        .children_named(name)
        .filter(|c| c.text().is_some())
        .collect();

    candidates
        .iter()
        .find(|c| matches!(c.attr("lang"), None | Some("any") | Some("en")))
        .or_else(|| candidates.first())
        .and_then(|c| c.text())
        .map(str::to_string)
}

fn location(el: &Element) -> Option<ProviderLocation> {
    let latitude = el.child_text("Latitude")?.parse().ok()?;
    let longitude = el.child_text("Longitude")?.parse().ok()?;
    Some(ProviderLocation {
        latitude,
        longitude,
    })
}

fn logo(el: &Element) -> Option<ProviderLogo> {
    let encoded: String = el.text()?.split_ascii_whitespace().collect();
    match BASE64_STANDARD.decode(encoded) {
        Ok(data) => Some(ProviderLogo {
            mime: el.attr("mime").map(str::to_string),
            data,
        }),
        Err(e) => {
            warn!("Ignoring undecodable provider logo: {}", e);
            None
        }
    }
}

fn valid_until(text: &str) -> Option<DateTime<Utc>> {
    let trimmed = text.trim().trim_end_matches('Z');
    match NaiveDateTime::parse_from_str(trimmed, VALID_UNTIL_FORMAT) {
        Ok(naive) => Some(Utc.from_utc_datetime(&naive)),
        Err(e) => {
            warn!("Unreadable ValidUntil {:?}, treating as no expiry: {}", text, e);
            None
        }
    }
}

fn texts(el: &Element, name: &str) -> Vec<String> {
    el.children_named(name)
        .filter_map(Element::text)
        .map(str::to_string)
        .collect()
}

fn boolean(text: &str) -> Option<bool> {
    match text.trim() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}
