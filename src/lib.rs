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

//! # eap-wifi-config
//!
//! Turns an EAP-config document (GEANT eap-metadata XML, as distributed by
//! eduroam CAT and geteduroam) into a validated enterprise Wi-Fi profile,
//! and derives the network descriptors a platform installer needs.
//!
//! ## Pipeline
//!
//! 1. [`document::EapDocument::parse`] decodes the XML into a structural tree
//! 2. [`selector::best_method`] picks one authentication method
//! 3. [`builder::ProfileBuilder`] normalizes it into a [`WifiProfile`],
//!    decoding CA certificates and opening the PKCS#12 client certificate
//! 4. [`suggestion`] derives SSID and Passpoint descriptors
//! 5. [`install::plan`] picks descriptors and a mechanism for a platform tier
//!
//! ## Quick Start
//!
//! ```no_run
//! use eap_wifi_config::{install, EapDocument, PlatformTier, ProfileBuilder};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = std::fs::read("example.eap-config")?;
//! let document = EapDocument::parse(&bytes)?;
//!
//! let profile = ProfileBuilder::new(&document)
//!     .passphrase("from the user")
//!     .build()?;
//!
//! let plan = install::plan(&profile, PlatformTier::from_api_level(30));
//! for suggestion in &plan.ssid_suggestions {
//!     println!("{} via {}", suggestion.ssid, suggestion.enterprise.eap_method);
//! }
//! if let Some(roaming) = &plan.roaming_suggestion {
//!     println!("Passpoint for {}", roaming.realm);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Persistence
//!
//! Profiles serialize to JSON with [`WifiProfile::to_json`] and are
//! re-validated by [`WifiProfile::from_json`].

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod builder;
pub mod certificate;
pub mod config;
pub mod credential;
pub mod document;
pub mod error;
pub mod install;
pub mod logging;
pub mod profile;
pub mod selector;
pub mod suggestion;


// Re-export main types at crate root for convenience
pub use builder::ProfileBuilder;
pub use certificate::{decode_certificates, Certificate};
pub use config::PipelineConfig;
pub use credential::{extract_client_certificate, ClientCertificate, PrivateKey};
pub use document::EapDocument;
pub use error::{CredentialError, EapError, ErrorCategory, Result};
pub use install::{InstallMechanism, InstallPlan, NetworkInstaller, PlatformTier};
pub use profile::{ClientCredential, EapMethod, Phase2, WifiProfile};
pub use selector::best_method;
pub use suggestion::{
    derive_roaming_suggestion, derive_ssid_suggestions, longest_common_suffix, PlatformCapabilities,
    RoamingSuggestion, SsidSuggestion,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
