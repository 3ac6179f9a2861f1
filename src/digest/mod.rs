//! SHA-256 digest behind one caller-facing contract.
//!
//! Two interchangeable backends produce identical output:
//! - [`NativeSha256`] (feature `native-digest`), the accelerated path.
//! - [`SoftSha256`], a complete software implementation that is always compiled.
//!
//! [`Sha256Digest`] picks the accelerated backend when it is available and
//! silently falls back to the software one whenever the primary reports an
//! error. Callers cannot tell which backend ran.

#[cfg(feature = "native-digest")]
mod native;
mod soft;

#[cfg(feature = "native-digest")]
pub use native::NativeSha256;
pub use soft::{SoftSha256, SoftSha256State};

use crate::Result;

/// A 256-bit digest backend.
pub trait DigestPrimitive: Send + Sync {
    /// Short backend label for diagnostics.
    fn name(&self) -> &'static str;

    fn digest(&self, input: &[u8]) -> Result<[u8; 32]>;
}

/// Facade over an optional primary backend with a software fallback.
pub struct Sha256Digest {
    primary: Option<Box<dyn DigestPrimitive>>,
    fallback: SoftSha256,
}

impl std::fmt::Debug for Sha256Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sha256Digest")
            .field("primary", &self.primary_name())
            .finish_non_exhaustive()
    }
}

impl Default for Sha256Digest {
    fn default() -> Self {
        Self::detect()
    }
}

impl Sha256Digest {
    /// Uses the accelerated backend when compiled in, otherwise software only.
    #[cfg(feature = "native-digest")]
    #[must_use]
    pub fn detect() -> Self {
        Self::with_primary(Box::new(NativeSha256))
    }

    #[cfg(not(feature = "native-digest"))]
    #[must_use]
    pub fn detect() -> Self {
        Self::software_only()
    }

    #[must_use]
    pub fn software_only() -> Self {
        Self {
            primary: None,
            fallback: SoftSha256,
        }
    }

    #[must_use]
    pub fn with_primary(primary: Box<dyn DigestPrimitive>) -> Self {
        Self {
            primary: Some(primary),
            fallback: SoftSha256,
        }
    }

    /// Name of the backend tried first.
    #[must_use]
    pub fn primary_name(&self) -> &'static str {
        self.primary
            .as_ref()
            .map_or_else(|| self.fallback.name(), |primary| primary.name())
    }

    /// Raw digest of `input`. Never fails.
    #[must_use]
    pub fn digest_bytes(&self, input: &[u8]) -> [u8; 32] {
        if let Some(primary) = &self.primary {
            match primary.digest(input) {
                Ok(out) => return out,
                Err(err) => {
                    tracing::warn!(
                        digest.backend = primary.name(),
                        error = %err,
                        "primary digest failed; using software fallback"
                    );
                }
            }
        }
        SoftSha256::hash(input)
    }

    /// Lowercase 64-character hex digest of the UTF-8 encoding of `text`.
    #[must_use]
    pub fn digest_hex(&self, text: &str) -> String {
        hex::encode(self.digest_bytes(text.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PhonebookError;

    const EMPTY: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
    const ABC: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    struct BrokenBackend;

    impl DigestPrimitive for BrokenBackend {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn digest(&self, _input: &[u8]) -> Result<[u8; 32]> {
            Err(PhonebookError::DigestComputationFailure {
                reason: "backend offline".to_string(),
            })
        }
    }

    #[test]
    fn detected_backend_matches_vectors() {
        let digest = Sha256Digest::detect();
        assert_eq!(digest.digest_hex(""), EMPTY);
        assert_eq!(digest.digest_hex("abc"), ABC);
    }

    #[test]
    fn failing_primary_falls_back_silently() {
        let digest = Sha256Digest::with_primary(Box::new(BrokenBackend));
        assert_eq!(digest.primary_name(), "broken");
        assert_eq!(digest.digest_hex("abc"), ABC);
    }

    #[test]
    fn software_only_reports_fallback_name() {
        let digest = Sha256Digest::software_only();
        assert_eq!(digest.primary_name(), "software");
        assert_eq!(digest.digest_hex(""), EMPTY);
    }

    #[test]
    fn utf8_text_is_hashed_as_bytes() {
        let digest = Sha256Digest::software_only();
        let text = "ফোন নম্বর";
        assert_eq!(
            digest.digest_hex(text),
            hex::encode(SoftSha256::hash(text.as_bytes()))
        );
    }

    #[cfg(feature = "native-digest")]
    #[test]
    fn backends_agree_on_random_inputs() {
        let mut rng = fastrand::Rng::with_seed(0x5eed);
        for _ in 0..256 {
            let len = rng.usize(0..300);
            let input: Vec<u8> = (0..len).map(|_| rng.u8(..)).collect();
            assert_eq!(
                NativeSha256.digest(&input).ok(),
                SoftSha256.digest(&input).ok(),
                "mismatch for {len}-byte input"
            );
        }
    }
}
