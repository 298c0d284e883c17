pub mod provider;
pub mod provider_factory;
pub mod providers;

pub use forge_core::{Config, Message, Role};
pub use provider::{GenerationOptions, LLMError, LLMProvider, Result, DEFAULT_TEMPERATURE};
pub use provider_factory::{create_provider, Provider, ProviderKind};
pub use providers::common::stream::{decode_step, decode_stream, Decoded, FrameFormat};
pub use providers::{AnthropicProvider, GeminiProvider, OllamaProvider, OpenAIProvider};
