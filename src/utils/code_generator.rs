//! Short code generation.
//!
//! Codes are drawn from the OS CSPRNG and encoded as URL-safe base64 without
//! padding, then truncated to the configured length.

use base64::Engine as _;

/// Default length of generated short codes.
pub const DEFAULT_CODE_LENGTH: usize = 8;

/// The system random source could not supply bytes.
#[derive(Debug, thiserror::Error)]
#[error("random source failure: {0}")]
pub struct GenerationError(#[from] getrandom::Error);

/// Source of fresh short codes.
///
/// Implementations must be safe to call from many tasks at once.
#[cfg_attr(test, mockall::automock)]
pub trait CodeGenerator: Send + Sync {
    /// Produces a new code of fixed length.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError`] if the random source fails. Callers surface
    /// this error rather than retrying.
    fn generate(&self) -> Result<String, GenerationError>;
}

/// Stateless generator backed by `getrandom`.
#[derive(Debug, Clone, Copy)]
pub struct RandomCodeGenerator {
    length: usize,
}

impl RandomCodeGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl Default for RandomCodeGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_LENGTH)
    }
}

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> Result<String, GenerationError> {
        // Every 3 random bytes encode to 4 base64 characters.
        let mut buffer = vec![0u8; self.length.div_ceil(4) * 3];

        getrandom::fill(&mut buffer)?;

        let mut code = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&buffer);
        code.truncate(self.length);

        Ok(code)
    }
}
