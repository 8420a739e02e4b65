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

//! Integration tests for EAP-TLS profiles

use crate::integration::{
    generate_intermediate_ca, generate_leaf, generate_root_ca, pkcs12_container, DocumentBuilder,
    Inner, Method, EAP_PEAP, EAP_TLS, NON_EAP_PAP,
};
use eap_wifi_config::{
    best_method, extract_client_certificate, ClientCredential, CredentialError, EapDocument,
    EapError, EapMethod, Phase2, ProfileBuilder,
};

#[test]
fn test_single_tls_method_yields_client_certificate() {
    let server_root = generate_root_ca("RADIUS Root CA");
    let user_root = generate_root_ca("User Root CA");
    let user_issuing = generate_intermediate_ca("User Issuing CA", &user_root);
    let client = generate_leaf("alice@example.org", &user_issuing);
    let container = pkcs12_container(&client, &[&user_issuing], "p12-pass");

    let xml = DocumentBuilder::new("example.org")
        .method(Method::tls(container, Some("p12-pass")).trusting(&[&server_root]))
        .ssid("eduroam")
        .build();

    let document = EapDocument::parse(xml.as_bytes()).expect("parse");
    let profile = ProfileBuilder::new(&document).build().expect("build");

    assert_eq!(profile.eap_method(), EapMethod::Tls);
    assert_eq!(profile.phase2(), Phase2::None);
    assert_eq!(profile.anonymous_identity(), Some("anonymous@example.org"));
    assert_eq!(profile.realm(), Some("example.org"));

    let ClientCredential::ClientCertificate(cert) = profile.client_credential() else {
        panic!("expected a client certificate");
    };
    assert_eq!(cert.leaf().der(), client.der());
    assert_eq!(cert.chain().len(), 2);
    assert_eq!(cert.chain()[1].common_name(), Some("User Issuing CA"));
    assert!(!cert.private_key().pkcs8_der().is_empty());
}

#[test]
fn test_wrong_passphrase_is_recoverable() {
    let root = generate_root_ca("User Root CA");
    let client = generate_leaf("alice@example.org", &root);
    let container = pkcs12_container(&client, &[], "right");

    let result = extract_client_certificate(&container, Some("wrong"));
    assert!(matches!(
        result,
        Err(EapError::Credential(CredentialError::WrongPassphraseOrCorrupt))
    ));

    let xml = DocumentBuilder::new("example.org")
        .method(Method::tls(container, None))
        .ssid("eduroam")
        .build();
    let document = EapDocument::parse(xml.as_bytes()).unwrap();

    let err = ProfileBuilder::new(&document)
        .passphrase("wrong")
        .build()
        .unwrap_err();
    assert!(err.is_recoverable());
    assert_eq!(
        err.credential_error(),
        Some(&CredentialError::WrongPassphraseOrCorrupt)
    );

    // Re-prompting with the right passphrase succeeds
    let profile = ProfileBuilder::new(&document)
        .passphrase("right")
        .build()
        .unwrap();
    assert_eq!(profile.eap_method(), EapMethod::Tls);
}

#[test]
fn test_tls_without_container_is_missing_certificate() {
    let mut method = Method::tls(Vec::new(), None);
    method.client_certificate = None;
    let xml = DocumentBuilder::new("example.org")
        .method(method)
        .ssid("eduroam")
        .build();
    let document = EapDocument::parse(xml.as_bytes()).unwrap();

    assert!(matches!(
        ProfileBuilder::new(&document).build(),
        Err(EapError::MissingClientCertificate(
            CredentialError::NoCertificateFound
        ))
    ));
}

#[test]
fn test_password_method_preferred_over_tls() {
    let root = generate_root_ca("User Root CA");
    let client = generate_leaf("alice@example.org", &root);
    let container = pkcs12_container(&client, &[], "pw");

    let xml = DocumentBuilder::new("example.org")
        .method(Method::tls(container, Some("pw")))
        .method(Method::password_based(EAP_PEAP, Inner::NonEap(NON_EAP_PAP)))
        .ssid("eduroam")
        .build();
    let document = EapDocument::parse(xml.as_bytes()).unwrap();
    let methods = &document.providers[0].authentication_methods;

    assert_eq!(best_method(methods).unwrap().eap_type, EAP_PEAP);

    // Explicit override picks TLS anyway
    let profile = ProfileBuilder::new(&document).method(0).build().unwrap();
    assert_eq!(profile.eap_method().code(), EAP_TLS);
}
