pub mod gemini;
pub mod human;
pub mod mock;

use anyhow::Result;
use async_trait::async_trait;

use crate::image::DataUri;

/// A single generation request: an instruction template, a prompt, and the
/// photo under review.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub instructions: String,
    pub prompt: String,
    pub image: DataUri,
}

/// Token usage from a single model call.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    /// Accumulate another usage into this one.
    pub fn add(&mut self, other: TokenUsage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }

    /// Total tokens (input + output).
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

/// The raw text a model produced, plus token usage when the provider
/// reports it.
#[derive(Debug, Clone)]
pub struct ModelReply {
    pub text: String,
    pub usage: Option<TokenUsage>,
}

/// The grading brain. Could be Gemini, a human at the terminal, or a test
/// script. Structured-output parsing happens in the flows, not here.
#[async_trait]
pub trait Model: Send + Sync {
    async fn generate(&self, request: &ModelRequest) -> Result<ModelReply>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_add_accumulates() {
        let mut usage = TokenUsage {
            input_tokens: 10,
            output_tokens: 5,
        };
        usage.add(TokenUsage {
            input_tokens: 3,
            output_tokens: 2,
        });
        assert_eq!(usage.input_tokens, 13);
        assert_eq!(usage.output_tokens, 7);
        assert_eq!(usage.total(), 20);
    }

    #[test]
    fn usage_default_is_zero() {
        assert_eq!(TokenUsage::default().total(), 0);
    }
}
