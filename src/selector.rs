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

//! Authentication method selection.
//!
//! A provider may offer several methods. Password-based tunnelled methods
//! are preferred because they need nothing beyond the document; TLS is
//! only chosen when its client certificate can actually be opened.

use tracing::{debug, info};

use crate::credential::extract_client_certificate_base64;
use crate::document::AuthenticationMethod;
use crate::profile::EapMethod;

/// Pick the best method using the passphrases embedded in the document.
pub fn best_method(methods: &[AuthenticationMethod]) -> Option<&AuthenticationMethod> {
    best_method_with_passphrase(methods, None)
}

/// Pick the best method, opening TLS containers with `passphrase` when
/// given and with the document's own passphrase otherwise.
///
/// Order: first PEAP, TTLS or PWD method; then the first TLS method whose
/// client certificate is extractable; then the first method of the list.
pub fn best_method_with_passphrase<'a>(
    methods: &'a [AuthenticationMethod],
    passphrase: Option<&str>,
) -> Option<&'a AuthenticationMethod> {
    let tunnelled = methods.iter().find(|m| {
        matches!(
            EapMethod::from_code(m.eap_type),
            Some(EapMethod::Peap | EapMethod::Ttls | EapMethod::Pwd)
        )
    });
    if let Some(method) = tunnelled {
        info!("Selected EAP type {} (password based)", method.eap_type);
        return Some(method);
    }

    let usable_tls = methods.iter().find(|m| {
        m.eap_type == EapMethod::Tls.code() && client_certificate_extractable(m, passphrase)
    });
    if let Some(method) = usable_tls {
        info!("Selected EAP-TLS with extractable client certificate");
        return Some(method);
    }

    let fallback = methods.first();
    if let Some(method) = fallback {
        info!("No preferred method usable, falling back to EAP type {}", method.eap_type);
    }
    fallback
}

fn client_certificate_extractable(method: &AuthenticationMethod, passphrase: Option<&str>) -> bool {
    let Some(client) = &method.client_side_credential else {
        return false;
    };
    let Some(container) = &client.client_certificate else {
        return false;
    };

    let passphrase = passphrase.or(client.passphrase.as_deref());
    match extract_client_certificate_base64(container, passphrase) {
        Ok(_) => true,
        Err(e) => {
            debug!("TLS method skipped: {}", e);
            false
        }
    }
}
