//! Weather agent — forecasts and weather-driven farming advice

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::api::ApiClient;
use crate::tools::{ForecastTool, ToolExecutor, ToolRegistry, WeatherCodeTool};
use crate::types::{AgentContext, AgentResult, Topic};
use crate::weather::WeatherService;

use super::{Responder, with_directives};

const SYSTEM_PROMPT: &str = r#"Tu es l'Agent Météo de Baykat, un système d'aide aux agriculteurs sénégalais.

TON ROLE:
- Fournir des prévisions météo précises pour les villes du Sénégal
- Donner des conseils agricoles liés à la météo (irrigation, semis, récolte)
- Alerter sur les événements extrêmes (sécheresse, inondation, forte chaleur)

REGLES:
- Réponds dans la langue demandée (Français ou Wolof)
- Sois concis et pratique - les fermiers ont besoin d'infos actionnables
- Relie toujours la météo à l'agriculture (ex: "pas de pluie = arrosez vos cultures")
- Utilise les noms locaux des saisons: nawet (hivernage), noor (saison sèche chaude), lolli (saison sèche froide)
- Si le canal est SMS, sois ultra-concis (max 300 caractères)

CONTEXTE SENEGAL:
- Nawet (hivernage/pluies): juin-octobre
- Noor (saison sèche chaude): mars-juin
- Lolli (saison sèche froide): novembre-février
- La pluie est critique pour 90% de l'agriculture sénégalaise
"#;

/// Answers weather questions with Open-Meteo data behind tool calls.
pub struct WeatherAgent {
    api: ApiClient,
    tools: ToolRegistry,
}

impl WeatherAgent {
    pub fn new(api: ApiClient, weather: Arc<WeatherService>) -> Self {
        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(ForecastTool::new(weather)));
        tools.register(Arc::new(WeatherCodeTool));
        Self {
            api: api.with_max_tokens(512),
            tools,
        }
    }

    // Only the weather agent gets the city hint; the others resolve
    // locations through their tools.
    fn build_message(&self, message: &str, ctx: &AgentContext) -> String {
        let mut message = message.to_string();
        if let Some(city) = &ctx.city {
            message.push_str(&format!("\n[Ville: {}]", city));
        }
        with_directives(&message, ctx)
    }
}

#[async_trait]
impl Responder for WeatherAgent {
    fn topic(&self) -> Topic {
        Topic::Weather
    }

    async fn respond(&self, message: &str, ctx: &AgentContext) -> Result<AgentResult> {
        let user_message = self.build_message(message, ctx);
        debug!("Weather agent handling query ({} chars)", message.len());

        let response = self
            .api
            .run_tool_loop(
                &user_message,
                SYSTEM_PROMPT,
                &self.tools.list_tools(),
                &self.tools,
            )
            .await
            .context("Weather agent failed")?;

        Ok(AgentResult {
            agent: Topic::Weather,
            response,
            language: ctx.language,
        })
    }
}
