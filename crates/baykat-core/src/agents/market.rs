//! Market agent — prices, trends, and where to sell

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::api::ApiClient;
use crate::tools::{CityMarketsTool, ComparePricesTool, CropPricesTool, ToolExecutor, ToolRegistry};
use crate::types::{AgentContext, AgentResult, Topic};

use super::{Responder, with_directives};

const SYSTEM_PROMPT: &str = r#"Tu es l'Agent Marché de Baykat, un système d'aide aux agriculteurs sénégalais.

TON ROLE:
- Fournir les prix actuels des produits agricoles au Sénégal
- Conseiller sur le meilleur moment et lieu pour vendre
- Analyser les tendances de prix
- Aider les fermiers à maximiser leurs revenus

EXPERTISE:
- Prix en FCFA (franc CFA) par kg
- Marchés principaux: Sandaga (Dakar), Thiaroye (Dakar), Kaolack, Touba Ocass, Saint-Louis, Ziguinchor
- Tendances saisonnières et logique prix/offre/demande
- Transport et logistique entre zones de production et marchés

REGLES:
- Réponds dans la langue demandée (Français ou Wolof)
- Toujours donner des prix concrets en FCFA
- Recommander le meilleur marché pour vendre en tenant compte de la distance
- Mentionner les périodes optimales de vente
- Si canal SMS: ultra-concis (max 300 caractères)

CONTEXTE PRIX:
- Les prix varient fortement selon la saison (récolte = prix bas, soudure = prix hauts)
- Dakar a généralement les prix les plus élevés mais les coûts de transport sont plus importants
- Le stockage permet souvent de doubler le prix de vente (si les conditions sont bonnes)
"#;

/// Answers price and market questions from the static dataset.
pub struct MarketAgent {
    api: ApiClient,
    tools: ToolRegistry,
}

impl MarketAgent {
    pub fn new(api: ApiClient) -> Self {
        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(CropPricesTool));
        tools.register(Arc::new(CityMarketsTool));
        tools.register(Arc::new(ComparePricesTool));
        Self {
            api: api.with_max_tokens(512),
            tools,
        }
    }
}

#[async_trait]
impl Responder for MarketAgent {
    fn topic(&self) -> Topic {
        Topic::Market
    }

    async fn respond(&self, message: &str, ctx: &AgentContext) -> Result<AgentResult> {
        let user_message = with_directives(message, ctx);
        debug!("Market agent handling query ({} chars)", message.len());

        let response = self
            .api
            .run_tool_loop(
                &user_message,
                SYSTEM_PROMPT,
                &self.tools.list_tools(),
                &self.tools,
            )
            .await
            .context("Market agent failed")?;

        Ok(AgentResult {
            agent: Topic::Market,
            response,
            language: ctx.language,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registers_market_tools() {
        let agent = MarketAgent::new(ApiClient::new("test-key".to_string(), None));
        assert_eq!(agent.tools.len(), 3);
        assert_eq!(agent.topic(), Topic::Market);

        let names: Vec<String> = agent
            .tools
            .list_tools()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert!(names.contains(&"get_crop_prices".to_string()));
        assert!(names.contains(&"get_city_markets".to_string()));
        assert!(names.contains(&"compare_prices".to_string()));
    }
}
