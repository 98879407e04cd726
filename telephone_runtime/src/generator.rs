//! Artifact generation seam.
//!
//! The image service itself lives outside this crate. The game only needs
//! `prompt -> Artifact` or an error it can show to the group; retrying is
//! always the group's decision.

use thiserror::Error;

use telephone_engine::hashing::hex_digest;
use telephone_engine::Artifact;

/// Style keywords appended to every prompt before generation.
pub const DEFAULT_PROMPT_SUFFIX: &str =
    ", photorealistic, realistic photograph, 8k, highly detailed, sharp focus, cinematic lighting";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("prompt must not be empty")]
    EmptyPrompt,
    #[error("generation service failed: {0}")]
    Upstream(String),
    #[error("no image data found in response")]
    NoPayload,
}

pub trait ArtifactGenerator {
    fn generate(&self, prompt: &str) -> Result<Artifact, GenerationError>;
}

/// Append the style suffix to a trimmed prompt.
pub fn enhance_prompt(prompt: &str, suffix: &str) -> Result<String, GenerationError> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(GenerationError::EmptyPrompt);
    }
    Ok(format!("{prompt}{suffix}"))
}

/// Offline stand-in: the artifact is the SHA-256 of the enhanced prompt.
#[derive(Debug, Clone)]
pub struct DigestGenerator {
    suffix: String,
}

impl DigestGenerator {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }
}

impl Default for DigestGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_PROMPT_SUFFIX)
    }
}

impl ArtifactGenerator for DigestGenerator {
    fn generate(&self, prompt: &str) -> Result<Artifact, GenerationError> {
        let enhanced = enhance_prompt(prompt, &self.suffix)?;
        Ok(Artifact::new(format!(
            "sha256:{}",
            hex_digest(enhanced.as_bytes())
        )))
    }
}
