// ABOUTME: Agent module — generation provider contract and the Gemini REST client.
// ABOUTME: Wire types live in wire, provider trait and implementation in provider.

pub mod provider;
pub mod wire;

pub use provider::{
    FALLBACK_TEXT, GenerationProvider, GenerationRequest, GenerationResult, GeminiProvider,
    HistoryEntry, create_provider,
};
