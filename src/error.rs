//! Error types for the EAP-config pipeline.
//!
//! Errors fall into a small taxonomy (see [`ErrorCategory`]): problems with
//! the document itself are fatal for that document, credential problems can
//! be retried with a different passphrase, and toolkit failures point at a
//! broken environment rather than bad input.

use thiserror::Error;

/// Result type alias using [`EapError`].
pub type Result<T> = std::result::Result<T, EapError>;

/// Errors raised while opening a client certificate container.
///
/// These are recoverable: the caller is expected to prompt for a new
/// passphrase and retry only the extraction step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// The container could not be opened with the given passphrase, or its
    /// data is corrupt. PKCS#12 does not distinguish the two.
    #[error("Wrong passphrase or corrupt certificate container")]
    WrongPassphraseOrCorrupt,

    /// The container opened but no entry carries a usable certificate chain.
    #[error("No certificate found in container")]
    NoCertificateFound,
}

/// Broad classification of an [`EapError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The document cannot be used ("cannot use this configuration").
    Document,
    /// Credential material could not be unlocked; re-prompt and retry.
    Credential,
    /// Missing cryptographic primitive or encoding failure.
    Toolkit,
    /// Local configuration, serialization or I/O problem.
    Environment,
}

/// Errors that can occur while parsing, building or persisting profiles.
#[derive(Debug, Error)]
pub enum EapError {
    /// The document is not well-formed XML or not an EAP-config document.
    #[error("Malformed EAP-config document: {0}")]
    MalformedDocument(String),

    /// A field required to build a profile is absent.
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// The selected method uses an EAP type this pipeline cannot configure.
    #[error("Unsupported EAP type: {0}")]
    UnsupportedEapType(i32),

    /// The inner (phase 2) authentication code is not recognized.
    #[error("Unsupported phase 2 method: {0}")]
    UnsupportedPhase2(i32),

    /// A certificate could not be decoded.
    #[error("Certificate parsing error: {0}")]
    InvalidCertificate(String),

    /// The requested identity provider does not exist in the document.
    #[error("Identity provider not found: {0}")]
    ProviderNotFound(String),

    /// The requested authentication method index is out of range.
    #[error("Authentication method {index} not found (provider has {available})")]
    MethodNotFound {
        /// Requested index.
        index: usize,
        /// Number of methods the provider offers.
        available: usize,
    },

    /// A TLS method was selected but its client certificate is unusable.
    #[error("Client certificate required but unavailable: {0}")]
    MissingClientCertificate(#[source] CredentialError),

    /// A profile violates one of its construction invariants.
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    /// Credential extraction failed outside of a profile build.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// Cryptographic toolkit failure (not caused by user input).
    #[error("Certificate toolkit failure: {0}")]
    Toolkit(String),

    /// Persisted profile (de)serialization failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Pipeline configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EapError {
    /// Create a malformed document error with the given message.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedDocument(msg.into())
    }

    /// Create a missing field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    /// Create a certificate parsing error.
    pub fn invalid_certificate(msg: impl Into<String>) -> Self {
        Self::InvalidCertificate(msg.into())
    }

    /// Create an invalid profile error.
    pub fn invalid_profile(msg: impl Into<String>) -> Self {
        Self::InvalidProfile(msg.into())
    }

    /// Create a toolkit error.
    pub fn toolkit(msg: impl Into<String>) -> Self {
        Self::Toolkit(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Classify this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MalformedDocument(_)
            | Self::MissingField(_)
            | Self::UnsupportedEapType(_)
            | Self::UnsupportedPhase2(_)
            | Self::InvalidCertificate(_)
            | Self::ProviderNotFound(_)
            | Self::MethodNotFound { .. }
            | Self::InvalidProfile(_) => ErrorCategory::Document,
            Self::MissingClientCertificate(_) | Self::Credential(_) => ErrorCategory::Credential,
            Self::Toolkit(_) => ErrorCategory::Toolkit,
            Self::Serialization(_) | Self::Config(_) | Self::Io(_) => ErrorCategory::Environment,
        }
    }

    /// Returns true if retrying with a different passphrase may succeed.
    pub fn is_recoverable(&self) -> bool {
        self.category() == ErrorCategory::Credential
    }

    /// Returns the underlying credential error, if any.
    pub fn credential_error(&self) -> Option<&CredentialError> {
        match self {
            Self::MissingClientCertificate(e) | Self::Credential(e) => Some(e),
            _ => None,
        }
    }
}
