//! baykat-core - routing and orchestration for farmer advice
//!
//! This crate provides:
//! - Keyword routing that picks the weather/agro/market agents without an LLM call
//! - Parallel fan-out over the routed agents and synthesis of their answers
//! - Heuristic fr/en/wo language detection for untagged requests
//! - The Anthropic API client with a bounded tool-use loop
//! - Open-Meteo forecasts and the embedded agronomy/market dataset the tools read

pub mod agents;
pub mod api;
pub mod data;
pub mod diagnosis;
pub mod language;
pub mod orchestrator;
pub mod profile;
pub mod routing;
pub mod tools;
pub mod types;
pub mod weather;

// Re-export main types for convenience
pub use agents::{AgroAgent, MarketAgent, Responder, WeatherAgent};
pub use api::{ApiClient, ApiMessage, ApiResponse, ContentBlock, MessageContent, ToolDefinition};
pub use diagnosis::PhotoDiagnoser;
pub use language::detect_language;
pub use orchestrator::{ApiSynthesizer, Orchestrator, Synthesis};
pub use profile::{InMemoryProfileStore, Profile, ProfileStore};
pub use routing::route;
pub use tools::{ToolExecutor, ToolHandler, ToolRegistry};
pub use types::{
    AgentContext, AgentResult, ChatRequest, Channel, Language, Metadata, OrchestrationResult,
    Topic,
};
pub use weather::WeatherService;
