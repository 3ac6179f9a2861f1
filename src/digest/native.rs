//! Accelerated SHA-256 from the `sha2` crate.

use sha2::{Digest, Sha256};

use super::DigestPrimitive;
use crate::Result;

#[derive(Debug, Clone, Copy, Default)]
pub struct NativeSha256;

impl DigestPrimitive for NativeSha256 {
    fn name(&self) -> &'static str {
        "native"
    }

    fn digest(&self, input: &[u8]) -> Result<[u8; 32]> {
        let mut hasher = Sha256::new();
        hasher.update(input);
        Ok(hasher.finalize().into())
    }
}
