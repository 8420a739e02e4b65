//! Integration test utilities and helpers
//!
//! Generates CA hierarchies with rcgen, wraps client certificates into
//! PKCS#12 containers with openssl and assembles EAP-config documents.

#![allow(dead_code)]

use base64::prelude::*;
use openssl::pkcs12::Pkcs12;
use openssl::pkey::PKey;
use openssl::stack::Stack;
use openssl::x509::X509;
use rcgen::{
    BasicConstraints, CertificateParams, DistinguishedName, DnType, IsCa, KeyPair,
    KeyUsagePurpose,
};

/// EAP type codes
pub const EAP_TLS: i32 = 13;
pub const EAP_TTLS: i32 = 21;
pub const EAP_PEAP: i32 = 25;
pub const EAP_PWD: i32 = 52;
pub const EAP_MSCHAPV2: i32 = 26;

/// Non-EAP inner method codes as they appear in documents
pub const NON_EAP_PAP: i32 = 1;
pub const NON_EAP_MSCHAP: i32 = 2;
pub const NON_EAP_MSCHAPV2: i32 = 3;

/// A generated certificate with its key
pub struct TestCert {
    pub cert: rcgen::Certificate,
    pub key: KeyPair,
}

impl TestCert {
    pub fn base64(&self) -> String {
        BASE64_STANDARD.encode(self.cert.der())
    }

    pub fn der(&self) -> &[u8] {
        self.cert.der()
    }
}

fn params(cn: &str) -> CertificateParams {
    let mut params = CertificateParams::default();
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, cn);
    dn.push(DnType::OrganizationName, "Example University");
    params.distinguished_name = dn;
    params
}

/// Self-signed root CA
pub fn generate_root_ca(cn: &str) -> TestCert {
    let mut params = params(cn);
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params.key_usages = vec![KeyUsagePurpose::KeyCertSign, KeyUsagePurpose::CrlSign];
    let key = KeyPair::generate().expect("key generation");
    let cert = params.self_signed(&key).expect("self-signed CA");
    TestCert { cert, key }
}

/// Intermediate CA signed by `issuer`
pub fn generate_intermediate_ca(cn: &str, issuer: &TestCert) -> TestCert {
    let mut params = params(cn);
    params.is_ca = IsCa::Ca(BasicConstraints::Constrained(0));
    params.key_usages = vec![KeyUsagePurpose::KeyCertSign];
    let key = KeyPair::generate().expect("key generation");
    let cert = params
        .signed_by(&key, &rcgen::Issuer::from_ca_cert_der(issuer.cert.der(), &issuer.key).unwrap())
        .expect("intermediate CA");
    TestCert { cert, key }
}

/// End-entity certificate signed by `issuer`
pub fn generate_leaf(cn: &str, issuer: &TestCert) -> TestCert {
    let mut params = params(cn);
    params.key_usages = vec![KeyUsagePurpose::DigitalSignature];
    let key = KeyPair::generate().expect("key generation");
    let cert = params
        .signed_by(&key, &rcgen::Issuer::from_ca_cert_der(issuer.cert.der(), &issuer.key).unwrap())
        .expect("leaf certificate");
    TestCert { cert, key }
}

/// PKCS#12 container with `client`, its key and `chain`
pub fn pkcs12_container(client: &TestCert, chain: &[&TestCert], passphrase: &str) -> Vec<u8> {
    let cert = X509::from_der(client.der()).expect("client X509");
    let pkey = PKey::private_key_from_pkcs8(&client.key.serialize_der()).expect("client key");
    let mut ca = Stack::new().expect("stack");
    for c in chain {
        ca.push(X509::from_der(c.der()).expect("chain X509"))
            .expect("stack push");
    }

    Pkcs12::builder()
        .name("client")
        .pkey(&pkey)
        .cert(&cert)
        .ca(ca)
        .build2(passphrase)
        .expect("PKCS#12 build")
        .to_der()
        .expect("PKCS#12 encode")
}

/// Inner method element
pub enum Inner {
    Eap(i32),
    NonEap(i32),
}

/// One `<AuthenticationMethod>` of a test document
#[derive(Default)]
pub struct Method {
    pub eap_type: i32,
    pub inner: Option<Inner>,
    pub ca: Vec<String>,
    pub server_ids: Vec<String>,
    pub outer_identity: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub client_certificate: Option<Vec<u8>>,
    pub passphrase: Option<String>,
}

impl Method {
    pub fn password_based(eap_type: i32, inner: Inner) -> Self {
        Self {
            eap_type,
            inner: Some(inner),
            server_ids: vec!["radius.example.org".to_string()],
            outer_identity: Some("anonymous@example.org".to_string()),
            username: Some("alice@example.org".to_string()),
            password: Some("correct horse".to_string()),
            ..Default::default()
        }
    }

    pub fn tls(container: Vec<u8>, passphrase: Option<&str>) -> Self {
        Self {
            eap_type: EAP_TLS,
            server_ids: vec!["radius.example.org".to_string()],
            outer_identity: Some("anonymous@example.org".to_string()),
            client_certificate: Some(container),
            passphrase: passphrase.map(str::to_string),
            ..Default::default()
        }
    }

    pub fn trusting(mut self, cas: &[&TestCert]) -> Self {
        self.ca = cas.iter().map(|c| c.base64()).collect();
        self
    }

    pub fn servers(mut self, names: &[&str]) -> Self {
        self.server_ids = names.iter().map(|s| s.to_string()).collect();
        self
    }

    fn to_xml(&self) -> String {
        let mut xml = format!(
            "<AuthenticationMethod>\n<EAPMethod><Type>{}</Type></EAPMethod>\n<ServerSideCredential>",
            self.eap_type
        );
        for ca in &self.ca {
            // Wrapped like producers do
            let wrapped: Vec<String> = ca
                .as_bytes()
                .chunks(76)
                .map(|c| String::from_utf8_lossy(c).into_owned())
                .collect();
            xml.push_str(&format!(
                "<CA format=\"X.509\" encoding=\"base64\">\n{}\n</CA>",
                wrapped.join("\n")
            ));
        }
        for id in &self.server_ids {
            xml.push_str(&format!("<ServerID>{}</ServerID>", id));
        }
        xml.push_str("</ServerSideCredential>\n<ClientSideCredential>");
        if let Some(v) = &self.outer_identity {
            xml.push_str(&format!("<OuterIdentity>{}</OuterIdentity>", v));
        }
        if let Some(v) = &self.username {
            xml.push_str(&format!("<UserName>{}</UserName>", v));
        }
        if let Some(v) = &self.password {
            xml.push_str(&format!("<Password>{}</Password>", v));
        }
        if let Some(container) = &self.client_certificate {
            xml.push_str(&format!(
                "<ClientCertificate format=\"PKCS12\" encoding=\"base64\">{}</ClientCertificate>",
                BASE64_STANDARD.encode(container)
            ));
        }
        if let Some(v) = &self.passphrase {
            xml.push_str(&format!("<Passphrase>{}</Passphrase>", v));
        }
        xml.push_str("</ClientSideCredential>\n");
        match &self.inner {
            Some(Inner::Eap(code)) => xml.push_str(&format!(
                "<InnerAuthenticationMethod><EAPMethod><Type>{}</Type></EAPMethod></InnerAuthenticationMethod>",
                code
            )),
            Some(Inner::NonEap(code)) => xml.push_str(&format!(
                "<InnerAuthenticationMethod><NonEAPAuthMethod><Type>{}</Type></NonEAPAuthMethod></InnerAuthenticationMethod>",
                code
            )),
            None => {}
        }
        xml.push_str("</AuthenticationMethod>\n");
        xml
    }
}

/// Builder for complete EAP-config documents
pub struct DocumentBuilder {
    id: String,
    methods: Vec<Method>,
    ssids: Vec<String>,
    oids: Vec<String>,
    display_name: Option<String>,
    valid_until: Option<String>,
}

impl DocumentBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            methods: Vec::new(),
            ssids: Vec::new(),
            oids: Vec::new(),
            display_name: Some("Example University".to_string()),
            valid_until: None,
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    pub fn ssid(mut self, ssid: &str) -> Self {
        self.ssids.push(ssid.to_string());
        self
    }

    pub fn oid(mut self, oid: &str) -> Self {
        self.oids.push(oid.to_string());
        self
    }

    pub fn valid_until(mut self, timestamp: &str) -> Self {
        self.valid_until = Some(timestamp.to_string());
        self
    }

    pub fn without_display_name(mut self) -> Self {
        self.display_name = None;
        self
    }

    /// The `<EAPIdentityProvider>` element alone
    pub fn provider_xml(&self) -> String {
        let mut xml = format!(
            "<EAPIdentityProvider ID=\"{}\" namespace=\"urn:RFC4282:realm\" lang=\"en\" version=\"1\">\n",
            self.id
        );
        if let Some(until) = &self.valid_until {
            xml.push_str(&format!("<ValidUntil>{}</ValidUntil>\n", until));
        }
        xml.push_str("<AuthenticationMethods>\n");
        for method in &self.methods {
            xml.push_str(&method.to_xml());
        }
        xml.push_str("</AuthenticationMethods>\n<CredentialApplicability>\n<IEEE80211>");
        for ssid in &self.ssids {
            xml.push_str(&format!("<SSID>{}</SSID>", ssid));
        }
        for oid in &self.oids {
            xml.push_str(&format!("<ConsortiumOID>{}</ConsortiumOID>", oid));
        }
        xml.push_str("<MinRSNProto>CCMP</MinRSNProto></IEEE80211>\n</CredentialApplicability>\n");
        if let Some(name) = &self.display_name {
            xml.push_str(&format!(
                "<ProviderInfo><DisplayName lang=\"en\">{}</DisplayName>\
                 <Helpdesk><EmailAddress>helpdesk@{}</EmailAddress></Helpdesk></ProviderInfo>\n",
                name, self.id
            ));
        }
        xml.push_str("</EAPIdentityProvider>\n");
        xml
    }

    /// The full document wrapped in `<EAPIdentityProviderList>`
    pub fn build(&self) -> String {
        wrap_list(&[self])
    }
}

/// Several providers in one document
pub fn wrap_list(providers: &[&DocumentBuilder]) -> String {
    let body: String = providers.iter().map(|p| p.provider_xml()).collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
         <EAPIdentityProviderList xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" \
         xsi:noNamespaceSchemaLocation=\"eap-metadata.xsd\">\n{}</EAPIdentityProviderList>\n",
        body
    )
}
