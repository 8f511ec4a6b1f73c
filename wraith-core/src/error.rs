//! Error types for WRAITH.
//!
//! One error enum for the whole protocol, built with `thiserror`. Structural
//! errors on user- or attacker-supplied text are raised before any partial state
//! is built; per-announcement errors are collected by scanners rather than
//! returned.

use thiserror::Error;

/// Result type alias using `WraithError`.
pub type Result<T> = std::result::Result<T, WraithError>;

/// Why the credential signer could not produce an assertion.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CredentialFailure {
    /// The platform has no authenticator support.
    #[error("credentials are not supported on this platform")]
    NotSupported,

    /// The user dismissed or refused the prompt.
    #[error("user cancelled the credential prompt")]
    UserCancelled,

    /// No credential is registered.
    #[error("no credential registered")]
    NoCredential,

    /// The authenticator already holds a credential for this relying party.
    #[error("credential already registered on this authenticator")]
    AlreadyRegistered,

    /// The signer did not answer in time.
    #[error("credential signer timed out after {seconds}s")]
    Timeout {
        /// Elapsed time budget in seconds
        seconds: u64,
    },

    /// Any other signer failure.
    #[error("{0}")]
    Other(String),
}

/// Main error type for all WRAITH operations.
#[derive(Debug, Error)]
pub enum WraithError {
    // ═══════════════════════════════════════════════════════════════════════════
    // CRYPTOGRAPHIC ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Bytes do not encode a valid secp256k1 point.
    #[error("Point decode failed: {0}")]
    PointDecodeError(String),

    /// Spending/viewing key derivation failed.
    #[error("Key derivation failed: {0}")]
    KeyDerivationError(String),

    /// Stealth key or address derivation hit a degenerate value.
    #[error("Stealth key derivation failed: {0}")]
    StealthDerivationError(String),

    /// Invalid key size.
    #[error("Invalid key: expected {expected} bytes, got {actual}")]
    InvalidKeySize {
        /// Required length
        expected: usize,
        /// Supplied length
        actual: usize,
    },

    // ═══════════════════════════════════════════════════════════════════════════
    // STEALTH ADDRESS ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Malformed meta-address prefix or length.
    #[error("Invalid meta-address format: {0}")]
    FormatError(String),

    /// Invalid stealth address format.
    #[error("Invalid stealth address: {0}")]
    InvalidStealthAddress(String),

    /// A single announcement could not be parsed.
    #[error("Invalid announcement: {0}")]
    AnnouncementParseError(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // CREDENTIAL ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// The credential signer was unavailable, refused, or timed out.
    #[error("Credential error: {0}")]
    CredentialError(CredentialFailure),

    // ═══════════════════════════════════════════════════════════════════════════
    // COLLABORATOR ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// The announcement feed failed to deliver a window.
    #[error("Announcement feed error: {0}")]
    FeedError(String),

    /// A key-value or record store failed.
    #[error("Store error: {0}")]
    StoreError(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // SERIALIZATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid hex encoding.
    #[error("Invalid hex encoding: {0}")]
    HexError(#[from] hex::FromHexError),

    /// File I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    // ═══════════════════════════════════════════════════════════════════════════
    // VALIDATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Input validation failed.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal invariant violation (should never happen).
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<CredentialFailure> for WraithError {
    fn from(failure: CredentialFailure) -> Self {
        WraithError::CredentialError(failure)
    }
}

impl WraithError {
    /// Returns true if this error is recoverable (can retry).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            WraithError::FeedError(_)
                | WraithError::StoreError(_)
                | WraithError::CredentialError(CredentialFailure::Timeout { .. })
        )
    }

    /// Returns true if this is a cryptographic error.
    pub fn is_crypto_error(&self) -> bool {
        matches!(
            self,
            WraithError::PointDecodeError(_)
                | WraithError::KeyDerivationError(_)
                | WraithError::StealthDerivationError(_)
                | WraithError::InvalidKeySize { .. }
        )
    }

    /// Returns true if the credential signer is the cause.
    pub fn is_credential_error(&self) -> bool {
        matches!(self, WraithError::CredentialError(_))
    }

    /// Returns true if this is a validation error.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            WraithError::ValidationError(_)
                | WraithError::FormatError(_)
                | WraithError::InvalidStealthAddress(_)
                | WraithError::AnnouncementParseError(_)
        )
    }
}
