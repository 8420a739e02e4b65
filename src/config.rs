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

//! Pipeline configuration file.
//!
//! ```toml
//! [platform]
//! tier = "suggestion"     # or "legacy-direct", "intent"
//! # api_level = 30        # alternative to `tier`
//! # supports_roaming = false
//! # multi_suffix_server_names = false
//!
//! [selection]
//! provider_id = "example.org"
//! method_index = 0
//!
//! [logging]
//! level = "info"
//! json = false
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::builder::ProfileBuilder;
use crate::error::{EapError, Result};
use crate::install::PlatformTier;
use crate::logging::LogLevel;
use crate::suggestion::PlatformCapabilities;

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Target platform.
    #[serde(default)]
    pub platform: PlatformConfig,

    /// Provider and method overrides.
    #[serde(default)]
    pub selection: SelectionConfig,

    /// Logging.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Target platform settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlatformConfig {
    /// Tier tag: "legacy-direct", "suggestion" or "intent".
    #[serde(default = "default_tier")]
    pub tier: String,

    /// Android-style API level. Takes the place of `tier` when set.
    #[serde(default)]
    pub api_level: Option<u32>,

    /// Override roaming support of the tier.
    #[serde(default)]
    pub supports_roaming: Option<bool>,

    /// Override multi-suffix server name support of the tier.
    #[serde(default)]
    pub multi_suffix_server_names: Option<bool>,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            tier: default_tier(),
            api_level: None,
            supports_roaming: None,
            multi_suffix_server_names: None,
        }
    }
}

fn default_tier() -> String {
    PlatformTier::Suggestion.as_str().to_string()
}

/// Provider and method overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SelectionConfig {
    /// Identity provider to use instead of the first one.
    #[serde(default)]
    pub provider_id: Option<String>,

    /// Authentication method index to use instead of automatic selection.
    #[serde(default)]
    pub method_index: Option<usize>,
}

impl SelectionConfig {
    /// Apply the overrides to a profile builder.
    pub fn apply<'a>(&self, mut builder: ProfileBuilder<'a>) -> ProfileBuilder<'a> {
        if let Some(id) = &self.provider_id {
            builder = builder.provider(id.clone());
        }
        if let Some(index) = self.method_index {
            builder = builder.method(index);
        }
        builder
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit structured JSON log lines.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl PipelineConfig {
    /// Parse configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| EapError::config(format!("Invalid TOML: {e}")))
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| EapError::config(format!("TOML serialize: {e}")))
    }

    /// Load and validate a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration, reporting every problem at once.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.platform.api_level.is_none() {
            if let Err(e) = PlatformTier::from_tag(&self.platform.tier) {
                errors.push(format!("platform.tier: {}", e));
            }
        }

        if let Some(id) = &self.selection.provider_id {
            if id.trim().is_empty() {
                errors.push("selection.provider_id must not be empty".to_string());
            }
        }

        if LogLevel::parse(&self.logging.level).is_none() {
            errors.push(format!(
                "logging.level must be one of trace, debug, info, warn, error (got '{}')",
                self.logging.level
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(EapError::config(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }

    /// The configured platform tier.
    pub fn tier(&self) -> Result<PlatformTier> {
        match self.platform.api_level {
            Some(level) => Ok(PlatformTier::from_api_level(level)),
            None => PlatformTier::from_tag(&self.platform.tier),
        }
    }

    /// The tier's capabilities with the configured overrides applied.
    pub fn capabilities(&self) -> Result<PlatformCapabilities> {
        let mut capabilities = self.tier()?.capabilities();
        if let Some(roaming) = self.platform.supports_roaming {
            capabilities.supports_roaming = roaming;
        }
        if let Some(multi) = self.platform.multi_suffix_server_names {
            capabilities.multi_suffix_server_names = multi;
        }
        Ok(capabilities)
    }
}
