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

//! Integration tests for document and build failures

use crate::integration::{DocumentBuilder, Inner, Method, EAP_MSCHAPV2, EAP_PEAP};
use eap_wifi_config::{EapDocument, EapError, ErrorCategory, ProfileBuilder};

#[test]
fn test_malformed_documents() {
    let cases: &[&[u8]] = &[
        b"",
        b"not xml at all",
        b"<EAPIdentityProviderList><EAPIdentityProvider>",
        b"<html><body/></html>",
        b"<EAPIdentityProviderList><EAPIdentityProvider ID=\"x\"/></EAPIdentityProviderList>",
    ];

    for case in cases {
        let err = EapDocument::parse(case).unwrap_err();
        assert!(
            matches!(err, EapError::MalformedDocument(_)),
            "unexpected error for {:?}: {:?}",
            String::from_utf8_lossy(case),
            err
        );
        assert_eq!(err.category(), ErrorCategory::Document);
        assert!(!err.is_recoverable());
    }
}

#[test]
fn test_unknown_elements_are_tolerated() {
    let xml = DocumentBuilder::new("example.org")
        .method(Method::password_based(EAP_PEAP, Inner::Eap(EAP_MSCHAPV2)))
        .ssid("eduroam")
        .build()
        .replace(
            "<AuthenticationMethods>",
            "<VendorExtension><Anything/></VendorExtension><AuthenticationMethods>",
        );

    let document = EapDocument::parse(xml.as_bytes()).unwrap();
    assert!(ProfileBuilder::new(&document).build().is_ok());
}

#[test]
fn test_unparsable_valid_until_degrades_to_none() {
    let xml = DocumentBuilder::new("example.org")
        .method(Method::password_based(EAP_PEAP, Inner::Eap(EAP_MSCHAPV2)))
        .ssid("eduroam")
        .valid_until("tomorrow-ish")
        .build();

    let document = EapDocument::parse(xml.as_bytes()).unwrap();
    assert!(document.providers[0].valid_until.is_none());
}

#[test]
fn test_missing_server_names_is_fatal() {
    let xml = DocumentBuilder::new("example.org")
        .method(Method::password_based(EAP_PEAP, Inner::Eap(EAP_MSCHAPV2)).servers(&[]))
        .ssid("eduroam")
        .build();

    let document = EapDocument::parse(xml.as_bytes()).unwrap();
    let err = ProfileBuilder::new(&document).build().unwrap_err();
    assert!(matches!(err, EapError::MissingField(_)));
    assert_eq!(err.category(), ErrorCategory::Document);
}

#[test]
fn test_corrupt_ca_entries_are_skipped() {
    let mut method = Method::password_based(EAP_PEAP, Inner::Eap(EAP_MSCHAPV2));
    method.ca = vec!["!!!not base64!!!".to_string(), "AAAA".to_string()];
    let xml = DocumentBuilder::new("example.org")
        .method(method)
        .ssid("eduroam")
        .build();

    let document = EapDocument::parse(xml.as_bytes()).unwrap();
    let profile = ProfileBuilder::new(&document).build().unwrap();
    assert!(profile.ca_certificates().is_empty());
}
