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

//! Integration tests for JSON persistence of profiles

use crate::integration::{
    generate_intermediate_ca, generate_leaf, generate_root_ca, pkcs12_container, DocumentBuilder,
    Inner, Method, EAP_PEAP, NON_EAP_PAP,
};
use chrono::{TimeZone, Utc};
use eap_wifi_config::{EapDocument, EapError, ProfileBuilder, WifiProfile};

#[test]
fn test_password_profile_round_trip() {
    let root = generate_root_ca("RADIUS Root CA");
    let xml = DocumentBuilder::new("example.org")
        .method(Method::password_based(EAP_PEAP, Inner::NonEap(NON_EAP_PAP)).trusting(&[&root]))
        .ssid("eduroam")
        .oid("5a03ba0000")
        .valid_until("2031-06-30T23:59:59Z")
        .build();
    let document = EapDocument::parse(xml.as_bytes()).unwrap();
    let profile = ProfileBuilder::new(&document).build().unwrap();

    let json = profile.to_json().unwrap();
    let restored = WifiProfile::from_json(&json).unwrap();
    assert_eq!(restored, profile);
    assert_eq!(
        restored.valid_until(),
        Some(Utc.with_ymd_and_hms(2031, 6, 30, 23, 59, 59).unwrap())
    );
}

#[test]
fn test_tls_profile_round_trip() {
    let root = generate_root_ca("User Root CA");
    let issuing = generate_intermediate_ca("User Issuing CA", &root);
    let client = generate_leaf("alice@example.org", &issuing);
    let container = pkcs12_container(&client, &[&issuing, &root], "pw");

    let xml = DocumentBuilder::new("example.org")
        .method(Method::tls(container, Some("pw")).trusting(&[&root]))
        .ssid("eduroam")
        .build();
    let document = EapDocument::parse(xml.as_bytes()).unwrap();
    let profile = ProfileBuilder::new(&document).build().unwrap();

    let restored = WifiProfile::from_json(&profile.to_json().unwrap()).unwrap();
    assert_eq!(restored, profile);
    assert_eq!(restored.ca_certificates()[0].fingerprint(), profile.ca_certificates()[0].fingerprint());
}

#[test]
fn test_tampered_profile_rejected() {
    let xml = DocumentBuilder::new("example.org")
        .method(Method::password_based(EAP_PEAP, Inner::NonEap(NON_EAP_PAP)))
        .ssid("eduroam")
        .build();
    let document = EapDocument::parse(xml.as_bytes()).unwrap();
    let profile = ProfileBuilder::new(&document).build().unwrap();

    let mut value: serde_json::Value = serde_json::from_str(&profile.to_json().unwrap()).unwrap();
    value["eap_method"] = serde_json::json!("TLS");

    assert!(matches!(
        WifiProfile::from_json(&value.to_string()),
        Err(EapError::InvalidProfile(_))
    ));
}

#[test]
fn test_expiry() {
    let xml = DocumentBuilder::new("example.org")
        .method(Method::password_based(EAP_PEAP, Inner::NonEap(NON_EAP_PAP)))
        .ssid("eduroam")
        .valid_until("2020-01-01T00:00:00")
        .build();
    let document = EapDocument::parse(xml.as_bytes()).unwrap();
    let profile = ProfileBuilder::new(&document).build().unwrap();

    assert!(profile.is_expired(Utc::now()));
    assert!(!profile.is_expired(Utc.with_ymd_and_hms(2019, 12, 31, 0, 0, 0).unwrap()));
}
