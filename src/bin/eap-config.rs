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

//! EAP-config Command-Line Tool
//!
//! Inspects EAP-config documents, builds Wi-Fi profiles from them and shows
//! how a profile would be installed on a given platform tier.
//!
//! # Usage
//!
//! ```text
//! eap-config [OPTIONS] <COMMAND>
//!
//! Commands:
//!   inspect      List providers and authentication methods of a document
//!   build        Build a Wi-Fi profile and write it as JSON
//!   plan         Show the install plan of a saved profile
//!   fingerprint  Print SHA-256 fingerprints of certificates
//!
//! Options:
//!   -c, --config <PATH>   Path to configuration file
//!   -v, --verbose         Enable verbose output
//!   -q, --quiet           Suppress non-error output
//!   -h, --help            Print help
//!   -V, --version         Print version
//! ```
//!
//! # Examples
//!
//! ```bash
//! # See what a document offers
//! eap-config inspect example.eap-config
//!
//! # Build a profile with user credentials
//! eap-config build example.eap-config --username alice@example.org --password s3cret -o profile.json
//!
//! # Show the install plan on an API 30 device
//! eap-config plan profile.json --api-level 30
//! ```

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use eap_wifi_config::certificate::{decode_certificates, format_fingerprint, Certificate};
use eap_wifi_config::config::{LoggingConfig, PipelineConfig};
use eap_wifi_config::logging::init_logging;
use eap_wifi_config::suggestion::RoamingCredential;
use eap_wifi_config::{
    best_method, install, EapDocument, EapError, EapMethod, Phase2, PlatformTier, ProfileBuilder,
    WifiProfile,
};

/// EAP-config Command-Line Tool
#[derive(Parser)]
#[command(name = "eap-config")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Enterprise Wi-Fi profiles from EAP-config documents", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List providers and authentication methods of a document
    Inspect {
        /// EAP-config document
        file: PathBuf,
    },

    /// Build a Wi-Fi profile and write it as JSON
    Build {
        /// EAP-config document
        file: PathBuf,

        /// Passphrase of the client certificate container
        #[arg(long)]
        passphrase: Option<String>,

        /// User name (overrides the document)
        #[arg(long, requires = "password")]
        username: Option<String>,

        /// Password (overrides the document)
        #[arg(long, requires = "username")]
        password: Option<String>,

        /// Identity provider ID (overrides config)
        #[arg(long, value_name = "ID")]
        provider: Option<String>,

        /// Authentication method index (overrides config)
        #[arg(long, value_name = "INDEX")]
        method: Option<usize>,

        /// Output file (default: stdout)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Show the install plan of a saved profile
    Plan {
        /// Profile JSON written by `build`
        profile: PathBuf,

        /// Platform tier: legacy-direct, suggestion or intent
        #[arg(long, conflicts_with = "api_level")]
        tier: Option<PlatformTier>,

        /// Android-style API level
        #[arg(long, value_name = "LEVEL")]
        api_level: Option<u32>,
    },

    /// Print SHA-256 fingerprints of certificates
    Fingerprint {
        /// PEM or base64 DER certificate file
        cert: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let logging = LoggingConfig {
        level: if cli.quiet {
            "error".to_string()
        } else if cli.verbose {
            "debug".to_string()
        } else {
            config.logging.level.clone()
        },
        json: config.logging.json,
    };
    if let Err(e) = init_logging(&logging) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    match run_command(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if e.is_recoverable() {
                eprintln!("Hint: check the passphrase or credentials and try again");
            }
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig, EapError> {
    match path {
        Some(path) => PipelineConfig::from_file(path),
        None => Ok(PipelineConfig::default()),
    }
}

fn run_command(cli: &Cli, config: &PipelineConfig) -> Result<(), EapError> {
    match &cli.command {
        Commands::Inspect { file } => cmd_inspect(file),
        Commands::Build {
            file,
            passphrase,
            username,
            password,
            provider,
            method,
            output,
        } => {
            let mut builder_opts = BuildOptions {
                passphrase: passphrase.clone(),
                credentials: None,
                provider: provider.clone(),
                method: *method,
            };
            if let (Some(username), Some(password)) = (username, password) {
                builder_opts.credentials = Some((username.clone(), password.clone()));
            }
            cmd_build(config, file, builder_opts, output.as_deref())
        }
        Commands::Plan {
            profile,
            tier,
            api_level,
        } => cmd_plan(config, profile, *tier, *api_level),
        Commands::Fingerprint { cert } => cmd_fingerprint(cert),
    }
}

// ============================================================================
// Command Implementations
// ============================================================================

fn cmd_inspect(file: &Path) -> Result<(), EapError> {
    let document = EapDocument::parse(&std::fs::read(file)?)?;

    for provider in &document.providers {
        println!("Provider: {}", provider.id);
        if let Some(name) = provider.display_name() {
            println!("  Name:        {}", name);
        }
        if let Some(until) = provider.valid_until {
            println!("  Valid until: {}", until.format("%Y-%m-%d %H:%M:%S UTC"));
        }
        let ssids: Vec<&str> = provider.ssids().collect();
        if !ssids.is_empty() {
            println!("  SSIDs:       {}", ssids.join(", "));
        }
        let oids: Vec<&str> = provider.consortium_oids().collect();
        if !oids.is_empty() {
            println!("  OIDs:        {}", oids.join(", "));
        }
        if let Some(helpdesk) = provider
            .provider_info
            .as_ref()
            .and_then(|info| info.helpdesk.as_ref())
        {
            for contact in [&helpdesk.email, &helpdesk.web, &helpdesk.phone]
                .into_iter()
                .flatten()
            {
                println!("  Helpdesk:    {}", contact);
            }
        }

        let best = best_method(&provider.authentication_methods);
        println!("  Methods:");
        for (index, method) in provider.authentication_methods.iter().enumerate() {
            let name = EapMethod::from_code(method.eap_type)
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("EAP type {}", method.eap_type));
            let inner = match method.inner_method {
                Some(code) => Phase2::from_code(code)
                    .map(|p| format!("/{}", p))
                    .unwrap_or_else(|| format!("/inner {}", code)),
                None => String::new(),
            };
            let marker = if best.is_some_and(|b| std::ptr::eq(b, method)) {
                " (preferred)"
            } else {
                ""
            };
            println!(
                "    [{}] {}{}{}: {} CA(s), servers: {}",
                index,
                name,
                inner,
                marker,
                decode_certificates(method.ca_certificates())?.len(),
                method.server_ids().join(", ")
            );
        }
    }

    Ok(())
}

struct BuildOptions {
    passphrase: Option<String>,
    credentials: Option<(String, String)>,
    provider: Option<String>,
    method: Option<usize>,
}

fn cmd_build(
    config: &PipelineConfig,
    file: &Path,
    opts: BuildOptions,
    output: Option<&Path>,
) -> Result<(), EapError> {
    let document = EapDocument::parse(&std::fs::read(file)?)?;

    let mut builder = config.selection.apply(ProfileBuilder::new(&document));
    if let Some(provider) = opts.provider {
        builder = builder.provider(provider);
    }
    if let Some(method) = opts.method {
        builder = builder.method(method);
    }
    if let Some(passphrase) = opts.passphrase {
        builder = builder.passphrase(passphrase);
    }
    if let Some((username, password)) = opts.credentials {
        builder = builder.credentials(username, password);
    }

    let profile = builder.build()?;
    let json = profile.to_json()?;

    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            tracing::info!("Profile written to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn cmd_plan(
    config: &PipelineConfig,
    profile_path: &Path,
    tier: Option<PlatformTier>,
    api_level: Option<u32>,
) -> Result<(), EapError> {
    let profile = WifiProfile::from_json(&std::fs::read_to_string(profile_path)?)?;

    let tier = match (tier, api_level) {
        (Some(tier), _) => tier,
        (None, Some(level)) => PlatformTier::from_api_level(level),
        (None, None) => config.tier()?,
    };
    let mut capabilities = tier.capabilities();
    if let Some(roaming) = config.platform.supports_roaming {
        capabilities.supports_roaming = roaming;
    }
    if let Some(multi) = config.platform.multi_suffix_server_names {
        capabilities.multi_suffix_server_names = multi;
    }

    if profile.is_expired(chrono::Utc::now()) {
        tracing::warn!("Profile configuration has expired, fetch a new one");
    }

    let plan = install::plan_with_capabilities(&profile, tier, capabilities);

    println!("Tier:      {}", plan.tier);
    println!("Mechanism: {}", plan.mechanism);
    for suggestion in &plan.ssid_suggestions {
        let enterprise = &suggestion.enterprise;
        println!("SSID {}:", suggestion.ssid);
        println!("  EAP:         {} / {}", enterprise.eap_method, enterprise.phase2);
        if let Some(identity) = &enterprise.identity {
            println!("  Identity:    {}", identity);
        }
        if let Some(anonymous) = &enterprise.anonymous_identity {
            println!("  Anonymous:   {}", anonymous);
        }
        println!("  Server name: {}", enterprise.server_name_match);
        println!("  CA certs:    {}", enterprise.ca_certificates.len());
    }

    match &plan.roaming_suggestion {
        Some(roaming) => {
            println!("Passpoint {}:", roaming.friendly_name);
            println!("  Realm:   {}", roaming.realm);
            println!("  Root CA: {}", roaming.root_ca.subject());
            let oids: Vec<String> = roaming
                .roaming_consortium_oids
                .iter()
                .map(|oid| format!("{:x}", oid))
                .collect();
            println!("  OIDs:    {}", oids.join(", "));
            match &roaming.credential {
                RoamingCredential::Certificate { fingerprint, .. } => {
                    println!("  Client:  {}", format_fingerprint(fingerprint))
                }
                RoamingCredential::UsernamePassword {
                    username, phase2, ..
                } => println!("  Client:  {} (TTLS/{})", username, phase2),
            }
        }
        None => println!("Passpoint: not available"),
    }

    Ok(())
}

fn cmd_fingerprint(path: &Path) -> Result<(), EapError> {
    let text = std::fs::read_to_string(path)?;

    let certificates: Vec<Certificate> = if text.contains("-----BEGIN") {
        pem_blocks(&text)
            .iter()
            .map(|block| Certificate::from_pem_or_base64(block))
            .collect::<Result<_, _>>()?
    } else {
        vec![Certificate::from_base64(&text)?]
    };

    for cert in &certificates {
        println!("{}", cert.subject());
        println!(
            "  CA: {}  Root: {}",
            cert.is_ca(),
            cert.is_root_certificate()
        );
        println!("  SHA-256: {}", format_fingerprint(cert.fingerprint()));
    }
    Ok(())
}

fn pem_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Option<String> = None;

    for line in text.lines().map(str::trim) {
        if line.starts_with("-----BEGIN") {
            current = Some(String::new());
        } else if line.starts_with("-----END") {
            if let Some(block) = current.take() {
                blocks.push(block);
            }
        } else if let Some(block) = current.as_mut() {
            block.push_str(line);
        }
    }

    blocks
}
