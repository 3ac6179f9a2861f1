//! Error types shared across the crate.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, PhonebookError>;

/// Every failure the trust and persistence layer can report.
///
/// All variants are recoverable: callers show the `Display` text to the user
/// and keep running. None of them leaves persisted or in-memory state half
/// written.
#[derive(Debug, Error)]
pub enum PhonebookError {
    /// The persisted key/value store cannot be read or written.
    #[error("storage unavailable: {reason}")]
    StorageUnavailable { reason: String },

    /// A persisted key holds corrupt JSON or an unexpected shape.
    #[error("persisted state under '{key}' is malformed: {reason}")]
    MalformedPersistedState { key: String, reason: String },

    /// Neither a digest nor an acceptable plaintext password is configured.
    #[error(
        "admin password is not configured; set PHONEBOOK_ADMIN_PASSWORD_HASH (recommended) \
         or PHONEBOOK_ADMIN_PASSWORD (8+ characters)"
    )]
    CredentialNotConfigured,

    /// The submitted password was empty after trimming.
    #[error("enter your admin password")]
    MissingPassword,

    /// Wrong password. `locked_for_ms` is non-zero when this failure started a lockout.
    #[error("wrong password{}", locked_suffix(*locked_for_ms))]
    VerificationFailure { locked_for_ms: i64 },

    /// A lockout window is still active; the credential was not checked.
    #[error("too many attempts; try again in {}", crate::lockout::format_duration(*remaining_ms))]
    Locked { remaining_ms: i64 },

    /// An imported payload was not valid JSON or had an unsupported shape.
    #[error("import rejected: {reason}")]
    ImportRejected { reason: String },

    /// A digest backend failed. Only ever seen by code that talks to a backend directly.
    #[error("digest computation failed: {reason}")]
    DigestComputationFailure { reason: String },

    /// A privileged operation was attempted without an active admin session.
    #[error("admin login required")]
    AdminRequired,

    /// A working-copy index does not point at a record.
    #[error("no record at index {index}")]
    RecordNotFound { index: usize },

    /// The shipped baseline data source could not be parsed.
    #[error("invalid baseline data: {reason}")]
    InvalidBaseline { reason: String },

    /// Static configuration could not be parsed.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Reading or writing a file outside the key/value store failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

fn locked_suffix(locked_for_ms: i64) -> String {
    if locked_for_ms > 0 {
        format!("; locked for {}", crate::lockout::format_duration(locked_for_ms))
    } else {
        String::new()
    }
}

impl PhonebookError {
    /// Stable machine-readable code for the variant.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::StorageUnavailable { .. } => "storage_unavailable",
            Self::MalformedPersistedState { .. } => "malformed_persisted_state",
            Self::CredentialNotConfigured => "credential_not_configured",
            Self::MissingPassword => "missing_password",
            Self::VerificationFailure { .. } => "verification_failure",
            Self::Locked { .. } => "locked",
            Self::ImportRejected { .. } => "import_rejected",
            Self::DigestComputationFailure { .. } => "digest_computation_failure",
            Self::AdminRequired => "admin_required",
            Self::RecordNotFound { .. } => "record_not_found",
            Self::InvalidBaseline { .. } => "invalid_baseline",
            Self::InvalidConfig { .. } => "invalid_config",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
        }
    }

    pub(crate) fn storage(err: impl std::fmt::Display) -> Self {
        Self::StorageUnavailable {
            reason: err.to_string(),
        }
    }

    pub(crate) fn import(reason: impl Into<String>) -> Self {
        Self::ImportRejected {
            reason: reason.into(),
        }
    }
}
