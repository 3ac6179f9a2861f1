//! Admin credential resolution and verification.

use crate::config::AdminConfig;
use crate::constants::{DEFAULT_ADMIN_PASSWORD, DIGEST_PREFIX, MIN_PLAINTEXT_PASSWORD_CHARS};
use crate::digest::Sha256Digest;

/// Credential mode, resolved once from [`AdminConfig`].
///
/// A non-empty digest always wins; the plaintext password is never consulted
/// while a digest is configured.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// `sha256(salt + ":" + password)` compared against `digest` (already normalized).
    Digest { salt: String, digest: String },
    /// Legacy exact-match password.
    Plaintext { password: String },
    Unconfigured,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mode())
    }
}

impl Credential {
    #[must_use]
    pub fn from_config(config: &AdminConfig) -> Self {
        let digest = normalize_digest_text(&config.password_hash);
        if !digest.is_empty() {
            return Self::Digest {
                salt: config.password_salt.clone(),
                digest,
            };
        }
        let password = config.password.trim();
        if password.is_empty() {
            Self::Unconfigured
        } else {
            Self::Plaintext {
                password: password.to_string(),
            }
        }
    }

    /// Whether login should be offered at all.
    ///
    /// A plaintext password only counts when it is not the published
    /// placeholder and has at least eight characters.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        match self {
            Self::Digest { .. } => true,
            Self::Plaintext { password } => {
                password != DEFAULT_ADMIN_PASSWORD
                    && password.chars().count() >= MIN_PLAINTEXT_PASSWORD_CHARS
            }
            Self::Unconfigured => false,
        }
    }

    /// Checks `candidate`. The result carries no hint of the mode in use.
    #[must_use]
    pub fn verify(&self, candidate: &str, hasher: &Sha256Digest) -> bool {
        match self {
            Self::Digest { salt, digest } => {
                let computed = hasher.digest_hex(&format!("{salt}:{candidate}"));
                normalize_digest_text(&computed) == *digest
            }
            Self::Plaintext { password } => candidate == password,
            Self::Unconfigured => false,
        }
    }

    fn mode(&self) -> &'static str {
        match self {
            Self::Digest { .. } => "Credential::Digest",
            Self::Plaintext { .. } => "Credential::Plaintext",
            Self::Unconfigured => "Credential::Unconfigured",
        }
    }
}

/// Trims, drops an optional `sha256:` prefix, and lowercases a digest string.
#[must_use]
pub fn normalize_digest_text(text: &str) -> String {
    let trimmed = text.trim();
    trimmed
        .strip_prefix(DIGEST_PREFIX)
        .unwrap_or(trimmed)
        .to_lowercase()
}
