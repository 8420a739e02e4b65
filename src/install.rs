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

//! Installation strategy selection.
//!
//! The platform's capability tier decides which descriptors are produced
//! and how they are handed to the operating system. The actual OS call is
//! behind the [`NetworkInstaller`] trait.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{EapError, Result};
use crate::profile::WifiProfile;
use crate::suggestion::{
    derive_roaming_suggestion, derive_ssid_suggestions, PlatformCapabilities, RoamingSuggestion,
    SsidSuggestion,
};

/// API level from which network suggestions are available.
pub const SUGGESTION_API_LEVEL: u32 = 29;

/// API level from which the system "add networks" intent is available.
pub const INTENT_API_LEVEL: u32 = 30;

/// Capability tier of the target platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlatformTier {
    /// Networks are written directly into the system configuration.
    LegacyDirect,
    /// Networks are offered as app suggestions.
    Suggestion,
    /// Networks are handed to a system dialog for the user to confirm.
    Intent,
}

impl PlatformTier {
    /// Parse a tier tag (`legacy`, `legacy-direct`, `suggestion`, `intent`).
    pub fn from_tag(tag: &str) -> Result<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "legacy" | "legacy-direct" | "legacy_direct" => Ok(Self::LegacyDirect),
            "suggestion" => Ok(Self::Suggestion),
            "intent" => Ok(Self::Intent),
            other => Err(EapError::config(format!("Unknown platform tier: {}", other))),
        }
    }

    /// Tier for an Android-style API level.
    pub fn from_api_level(level: u32) -> Self {
        match level {
            l if l >= INTENT_API_LEVEL => Self::Intent,
            l if l >= SUGGESTION_API_LEVEL => Self::Suggestion,
            _ => Self::LegacyDirect,
        }
    }

    /// Canonical tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LegacyDirect => "legacy-direct",
            Self::Suggestion => "suggestion",
            Self::Intent => "intent",
        }
    }

    /// Default capabilities of this tier.
    pub fn capabilities(&self) -> PlatformCapabilities {
        PlatformCapabilities {
            multi_suffix_server_names: !matches!(self, Self::LegacyDirect),
            supports_roaming: true,
        }
    }

    /// How descriptors are installed on this tier.
    pub fn mechanism(&self) -> InstallMechanism {
        match self {
            Self::LegacyDirect => InstallMechanism::DirectConfiguration,
            Self::Suggestion => InstallMechanism::NetworkSuggestions,
            Self::Intent => InstallMechanism::SystemIntent,
        }
    }
}

impl fmt::Display for PlatformTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformTier {
    type Err = EapError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_tag(s)
    }
}

/// How the installer hands descriptors to the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstallMechanism {
    /// Write network configurations directly.
    DirectConfiguration,
    /// Register network suggestions.
    NetworkSuggestions,
    /// Launch the system add-networks dialog.
    SystemIntent,
}

impl fmt::Display for InstallMechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::DirectConfiguration => "direct configuration",
            Self::NetworkSuggestions => "network suggestions",
            Self::SystemIntent => "system intent",
        })
    }
}

/// Everything an installer needs for one profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPlan {
    /// Target tier.
    pub tier: PlatformTier,
    /// Installation mechanism.
    pub mechanism: InstallMechanism,
    /// Capabilities the descriptors were derived with.
    pub capabilities: PlatformCapabilities,
    /// One suggestion per SSID.
    pub ssid_suggestions: Vec<SsidSuggestion>,
    /// Passpoint suggestion, if the profile and platform allow one.
    pub roaming_suggestion: Option<RoamingSuggestion>,
}

impl InstallPlan {
    /// Whether the plan installs nothing.
    pub fn is_empty(&self) -> bool {
        self.ssid_suggestions.is_empty() && self.roaming_suggestion.is_none()
    }

    /// Number of descriptors in the plan.
    pub fn descriptor_count(&self) -> usize {
        self.ssid_suggestions.len() + usize::from(self.roaming_suggestion.is_some())
    }
}

/// Plan the installation of `profile` on `tier` with the tier's default
/// capabilities.
pub fn plan(profile: &WifiProfile, tier: PlatformTier) -> InstallPlan {
    plan_with_capabilities(profile, tier, tier.capabilities())
}

/// Plan the installation of `profile` on `tier` with explicit capabilities.
pub fn plan_with_capabilities(
    profile: &WifiProfile,
    tier: PlatformTier,
    capabilities: PlatformCapabilities,
) -> InstallPlan {
    let ssid_suggestions = derive_ssid_suggestions(profile, &capabilities);
    let roaming_suggestion = derive_roaming_suggestion(profile, &capabilities);

    let plan = InstallPlan {
        tier,
        mechanism: tier.mechanism(),
        capabilities,
        ssid_suggestions,
        roaming_suggestion,
    };

    info!(
        "Install plan for {}: {} descriptors via {}",
        profile.provider_id(),
        plan.descriptor_count(),
        plan.mechanism
    );
    plan
}

/// Platform integration that performs the actual installation.
pub trait NetworkInstaller: Send + Sync {
    /// Tier of the platform this installer runs on.
    fn tier(&self) -> PlatformTier;

    /// Capabilities to derive descriptors with. Defaults to the tier's.
    fn capabilities(&self) -> PlatformCapabilities {
        self.tier().capabilities()
    }

    /// Install every descriptor of `plan`.
    fn install(&self, plan: &InstallPlan) -> Result<()>;
}

/// Plan `profile` for `installer`'s platform and install it.
///
/// Returns the plan that was installed.
pub fn install_profile<I: NetworkInstaller + ?Sized>(
    installer: &I,
    profile: &WifiProfile,
) -> Result<InstallPlan> {
    let plan = plan_with_capabilities(profile, installer.tier(), installer.capabilities());
    if plan.is_empty() {
        return Err(EapError::invalid_profile(
            "nothing to install for this platform",
        ));
    }

    debug!("Handing plan to installer");
    installer.install(&plan)?;
    Ok(plan)
}
