//! Agronomy agent — crop advice, disease diagnosis, zone recommendations

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::api::ApiClient;
use crate::tools::{CropInfoTool, DiagnoseTool, ToolExecutor, ToolRegistry, ZoneInfoTool};
use crate::types::{AgentContext, AgentResult, Topic};

use super::{Responder, with_directives};

const SYSTEM_PROMPT: &str = r#"Tu es l'Agent Agronomique de Baykat, un système d'aide aux agriculteurs sénégalais.

TON ROLE:
- Fournir des conseils culturaux précis pour les cultures du Sénégal
- Diagnostiquer les maladies et ravageurs des cultures
- Recommander des variétés adaptées aux zones agro-écologiques
- Donner le calendrier cultural optimal

EXPERTISE:
- Cultures principales: arachide (gerte), mil (dugub), riz (malo), maïs (mbaxal), niébé, tomate (tamaate), oignon (soble)
- Zones: Niayes, Bassin Arachidier, Casamance, Vallée du Fleuve, Zone Sylvo-pastorale, Sénégal Oriental
- Approche: agriculture durable, traitements biologiques privilégiés (neem, Bt), rotation des cultures

REGLES:
- Réponds dans la langue demandée (Français ou Wolof)
- Sois pratique et concret - donner des actions que le fermier peut faire maintenant
- Privilégie les solutions accessibles et peu couteuses
- Recommande toujours les variétés adaptées à la zone du fermier
- Si canal SMS: ultra-concis (max 300 caractères)
- Utilise les noms Wolof des cultures quand tu parles en Wolof

CONTEXTE SAISONS:
- Nawet (hivernage): juin-octobre - saison principale pour mil, arachide, maïs, niébé
- Noor/Lolli (saison sèche): novembre-juin - maraîchage irrigué (tomate, oignon) dans les Niayes et au Fleuve
"#;

/// Answers crop, disease, and zone questions from the static dataset.
pub struct AgroAgent {
    api: ApiClient,
    tools: ToolRegistry,
}

impl AgroAgent {
    pub fn new(api: ApiClient) -> Self {
        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(CropInfoTool));
        tools.register(Arc::new(DiagnoseTool));
        tools.register(Arc::new(ZoneInfoTool));
        Self {
            api: api.with_max_tokens(512),
            tools,
        }
    }
}

#[async_trait]
impl Responder for AgroAgent {
    fn topic(&self) -> Topic {
        Topic::Agro
    }

    async fn respond(&self, message: &str, ctx: &AgentContext) -> Result<AgentResult> {
        let user_message = with_directives(message, ctx);
        debug!("Agro agent handling query ({} chars)", message.len());

        let response = self
            .api
            .run_tool_loop(
                &user_message,
                SYSTEM_PROMPT,
                &self.tools.list_tools(),
                &self.tools,
            )
            .await
            .context("Agro agent failed")?;

        Ok(AgentResult {
            agent: Topic::Agro,
            response,
            language: ctx.language,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registers_agro_tools() {
        let agent = AgroAgent::new(ApiClient::new("test-key".to_string(), None));
        assert_eq!(agent.tools.len(), 3);
        assert_eq!(agent.topic(), Topic::Agro);

        let names: Vec<String> = agent
            .tools
            .list_tools()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert!(names.contains(&"get_crop_info".to_string()));
        assert!(names.contains(&"diagnose_disease".to_string()));
        assert!(names.contains(&"get_zone_info".to_string()));
    }
}
