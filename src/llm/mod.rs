//! Text-completion collaborator: one prompt in, one block of text out.

pub mod gemini;

use async_trait::async_trait;

use crate::error::ForgeResult;

pub use gemini::GeminiClient;

/// Sampling knobs forwarded to the service. `None` leaves the service default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SamplingConfig {
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
}

impl SamplingConfig {
    pub fn fixed(temperature: f32, top_p: f32, top_k: u32) -> Self {
        Self {
            temperature: Some(temperature),
            top_p: Some(top_p),
            top_k: Some(top_k),
        }
    }

    pub fn is_default(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub system_instruction: Option<String>,
    pub sampling: SamplingConfig,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system_instruction: None,
            sampling: SamplingConfig::default(),
        }
    }

    pub fn with_system(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_sampling(mut self, sampling: SamplingConfig) -> Self {
        self.sampling = sampling;
        self
    }
}

/// Opaque completion endpoint.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Run one completion. Implementations must fail with `ForgeError::Config`
    /// before touching the network when their credential is missing.
    async fn complete(&self, request: CompletionRequest) -> ForgeResult<String>;
}
