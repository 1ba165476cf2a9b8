//! Topic agents
//!
//! One specialist per routing topic. Each owns its tool registry and answers
//! with the fast model; request hints travel as bracketed directives in the
//! user message so the system prompts stay static.

mod agro;
mod market;
mod weather;

pub use agro::AgroAgent;
pub use market::MarketAgent;
pub use weather::WeatherAgent;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{AgentContext, AgentResult, Topic};

/// A topic specialist. Implementations answer one routing topic and never
/// see questions routed elsewhere.
#[async_trait]
pub trait Responder: Send + Sync {
    fn topic(&self) -> Topic;
    async fn respond(&self, message: &str, ctx: &AgentContext) -> Result<AgentResult>;
}

/// Append the `[Langue: ...]` and `[Canal: ...]` directives every agent
/// receives.
fn with_directives(message: &str, ctx: &AgentContext) -> String {
    format!(
        "{}\n[Langue: {}]\n[Canal: {}]",
        message,
        ctx.language.label(),
        ctx.channel
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Channel, Language};

    #[test]
    fn test_directives_carry_label_and_channel() {
        let ctx = AgentContext {
            city: None,
            language: Language::Wo,
            channel: Channel::Sms,
        };
        let message = with_directives("Quel prix pour le mil?", &ctx);
        assert!(message.starts_with("Quel prix pour le mil?"));
        assert!(message.ends_with("\n[Langue: Wolof]\n[Canal: sms]"));
    }

    #[test]
    fn test_directives_default_to_french_label() {
        let ctx = AgentContext {
            city: None,
            language: Language::Fr,
            channel: Channel::Web,
        };
        let message = with_directives("Bonjour", &ctx);
        assert!(message.contains("[Langue: Français]"));
        assert!(message.contains("[Canal: web]"));
    }
}
