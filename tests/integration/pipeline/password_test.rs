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

//! Integration tests for PEAP, TTLS and EAP-pwd profiles

use crate::integration::{
    generate_leaf, generate_root_ca, DocumentBuilder, Inner, Method, EAP_MSCHAPV2, EAP_PEAP,
    EAP_PWD, EAP_TTLS, NON_EAP_MSCHAP, NON_EAP_MSCHAPV2, NON_EAP_PAP,
};
use eap_wifi_config::install::{self, InstallMechanism};
use eap_wifi_config::{
    derive_roaming_suggestion, derive_ssid_suggestions, ClientCredential, EapDocument, EapMethod,
    Phase2, PlatformCapabilities, PlatformTier, ProfileBuilder,
};

fn build(method: Method) -> eap_wifi_config::WifiProfile {
    let xml = DocumentBuilder::new("example.org")
        .method(method)
        .ssid("eduroam")
        .build();
    let document = EapDocument::parse(xml.as_bytes()).expect("parse");
    ProfileBuilder::new(&document).build().expect("build")
}

#[test]
fn test_peap_pap() {
    let profile = build(Method::password_based(EAP_PEAP, Inner::NonEap(NON_EAP_PAP)));
    assert_eq!(profile.eap_method(), EapMethod::Peap);
    assert_eq!(profile.phase2(), Phase2::Pap);
}

#[test]
fn test_phase2_mapping() {
    let cases = [
        (Inner::NonEap(NON_EAP_PAP), Phase2::Pap),
        (Inner::NonEap(NON_EAP_MSCHAP), Phase2::Mschap),
        (Inner::NonEap(NON_EAP_MSCHAPV2), Phase2::Mschapv2),
        (Inner::Eap(EAP_MSCHAPV2), Phase2::Mschapv2),
    ];
    for (inner, expected) in cases {
        let profile = build(Method::password_based(EAP_TTLS, inner));
        assert_eq!(profile.phase2(), expected);
    }
}

#[test]
fn test_pwd_without_inner_method() {
    let mut method = Method::password_based(EAP_PWD, Inner::Eap(EAP_MSCHAPV2));
    method.inner = None;
    let profile = build(method);
    assert_eq!(profile.eap_method(), EapMethod::Pwd);
    assert_eq!(profile.phase2(), Phase2::None);
}

#[test]
fn test_identity_asymmetry() {
    let profile = build(Method::password_based(
        EAP_PEAP,
        Inner::Eap(EAP_MSCHAPV2),
    ));
    let suggestions = derive_ssid_suggestions(&profile, &PlatformCapabilities::default());

    assert_eq!(suggestions.len(), 1);
    let enterprise = &suggestions[0].enterprise;
    assert_eq!(enterprise.identity.as_deref(), Some("alice@example.org"));
    assert_eq!(
        enterprise.anonymous_identity.as_deref(),
        Some("anonymous@example.org")
    );
    assert_eq!(enterprise.password.as_deref(), Some("correct horse"));
    assert!(matches!(
        profile.client_credential(),
        ClientCredential::UsernamePassword { .. }
    ));
}

#[test]
fn test_ssid_only_profile() {
    let root = generate_root_ca("RADIUS Root CA");
    let profile = build(
        Method::password_based(EAP_PEAP, Inner::Eap(EAP_MSCHAPV2)).trusting(&[&root]),
    );
    let caps = PlatformCapabilities::default();

    assert_eq!(profile.ssids(), ["eduroam"]);
    assert_eq!(derive_ssid_suggestions(&profile, &caps).len(), 1);
    assert!(derive_roaming_suggestion(&profile, &caps).is_none());
}

#[test]
fn test_server_certificate_in_ca_list_is_ignored() {
    let root = generate_root_ca("RADIUS Root CA");
    let server = generate_leaf("radius.example.org", &root);
    let profile = build(
        Method::password_based(EAP_PEAP, Inner::Eap(EAP_MSCHAPV2)).trusting(&[&server, &root]),
    );

    assert_eq!(profile.ca_certificates().len(), 1);
    assert_eq!(
        profile.ca_certificates()[0].common_name(),
        Some("RADIUS Root CA")
    );
}

#[test]
fn test_multiple_server_names_per_tier() {
    let profile = build(
        Method::password_based(EAP_TTLS, Inner::NonEap(NON_EAP_PAP))
            .servers(&["radius1.example.org", "radius2.example.org"]),
    );

    let legacy = install::plan(&profile, PlatformTier::LegacyDirect);
    assert_eq!(legacy.mechanism, InstallMechanism::DirectConfiguration);
    assert_eq!(
        legacy.ssid_suggestions[0].enterprise.server_name_match,
        "example.org"
    );

    let modern = install::plan(&profile, PlatformTier::from_api_level(29));
    assert_eq!(modern.mechanism, InstallMechanism::NetworkSuggestions);
    assert_eq!(
        modern.ssid_suggestions[0].enterprise.server_name_match,
        "radius1.example.org;radius2.example.org"
    );
}
