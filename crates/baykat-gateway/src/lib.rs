//! baykat-gateway - HTTP front door
//!
//! Axum server exposing chat, SSE streaming, the SMS webhook, weather
//! forecasts, and the static dataset endpoints.

pub mod protocol;
pub mod server;

// Re-export main types
pub use protocol::{StreamEvent, chunk_text};
pub use server::{AppState, GatewayServer};
