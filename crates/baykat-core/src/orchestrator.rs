//! Request orchestration — fan-out, fan-in, synthesis
//!
//! One `orchestrate` call per farmer question: route by keywords, run every
//! routed agent concurrently, wait for all of them, then either pass the
//! single answer through or fuse several answers with one synthesis call.
//! Language detection runs last and only when the caller gave no language.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::agents::Responder;
use crate::api::ApiClient;
use crate::language::detect_language;
use crate::profile::{Profile, ProfileStore};
use crate::routing;
use crate::types::{
    AgentContext, AgentResult, ChatRequest, Language, Metadata, OrchestrationResult, Topic,
};

const SYNTHESIS_PROMPT: &str = "Tu synthétises les réponses de plusieurs agents agricoles \
en UNE réponse cohérente, concise et actionnable pour un agriculteur sénégalais, dans la \
langue demandée. Ne répète pas les informations, combine-les.";

/// Merges several agents' answers into one. Behind a trait so tests can count
/// calls without touching the network.
#[async_trait]
pub trait Synthesis: Send + Sync {
    /// `labeled_texts` are `[agent-name]: response` blocks in routing order.
    async fn summarize(&self, labeled_texts: &[String], target: Language) -> Result<String>;
}

/// Synthesis backed by one plain completion call. No tools, no loop.
pub struct ApiSynthesizer {
    api: ApiClient,
}

impl ApiSynthesizer {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api: api.with_max_tokens(1024),
        }
    }
}

#[async_trait]
impl Synthesis for ApiSynthesizer {
    async fn summarize(&self, labeled_texts: &[String], target: Language) -> Result<String> {
        let prompt = format!(
            "{}\n\n[Langue: {}]",
            labeled_texts.join("\n\n"),
            target.label()
        );
        self.api
            .complete(&prompt, SYNTHESIS_PROMPT)
            .await
            .context("Synthesis call failed")
    }
}

/// The orchestration entry point. Holds one responder per topic plus the
/// synthesizer and an optional profile store, all injected at construction.
pub struct Orchestrator {
    responders: HashMap<Topic, Arc<dyn Responder>>,
    synthesizer: Arc<dyn Synthesis>,
    profiles: Option<Arc<dyn ProfileStore>>,
}

impl Orchestrator {
    pub fn new(responders: Vec<Arc<dyn Responder>>, synthesizer: Arc<dyn Synthesis>) -> Self {
        let responders = responders.into_iter().map(|r| (r.topic(), r)).collect();
        Self {
            responders,
            synthesizer,
            profiles: None,
        }
    }

    /// Enable best-effort profile enrichment for requests carrying a user ID.
    pub fn with_profiles(mut self, profiles: Arc<dyn ProfileStore>) -> Self {
        self.profiles = Some(profiles);
        self
    }

    /// Which topics a message would be routed to. Deterministic and cheap;
    /// the streaming endpoint uses it to announce routing before the agents run.
    pub fn route(&self, message: &str) -> Vec<Topic> {
        routing::route(message)
    }

    /// Answer one farmer question end to end.
    pub async fn orchestrate(&self, request: ChatRequest) -> Result<OrchestrationResult> {
        let request = self.enrich(request).await;

        let routed = routing::route(&request.message);
        info!(
            "Routing to {:?} (channel: {}, session: {:?})",
            routed, request.channel, request.session_id
        );

        // Agents answer in the requested language; without one they get an
        // English directive and the detector decides afterwards.
        let directive = request.language.unwrap_or(Language::En);
        let ctx = AgentContext {
            city: request.city.clone(),
            language: directive,
            channel: request.channel,
        };

        let results = self.fan_out(&routed, &request.message, &ctx).await?;

        let agents_used: Vec<String> = results
            .iter()
            .map(|r| r.agent.agent_name().to_string())
            .collect();

        let response = if results.len() == 1 {
            // Single agent: forward verbatim, skip the extra call.
            results.into_iter().next().map(|r| r.response).unwrap_or_default()
        } else {
            self.synthesize(&results, directive).await
        };

        let language = match request.language {
            Some(lang) => lang,
            None => detect_language(&response),
        };

        let session_id = request
            .session_id
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        Ok(OrchestrationResult {
            response,
            language,
            agents_used,
            metadata: Metadata {
                session_id: Some(session_id),
                city: request.city,
                channel: request.channel,
                timestamp: chrono::Utc::now(),
            },
        })
    }

    /// Fill missing city/language from the stored profile, when there is one.
    /// Lookup failures are logged and ignored; enrichment never blocks a request.
    async fn enrich(&self, mut request: ChatRequest) -> ChatRequest {
        if request.city.is_some() && request.language.is_some() {
            return request;
        }
        let (Some(store), Some(user_id)) = (&self.profiles, request.user_id.clone()) else {
            return request;
        };

        match store.get_profile(&user_id).await {
            Ok(Some(Profile {
                city,
                preferred_language,
            })) => {
                if request.city.is_none() {
                    request.city = city;
                }
                if request.language.is_none() {
                    request.language = preferred_language;
                }
                debug!("Enriched request from profile '{}'", user_id);
            }
            Ok(None) => {}
            Err(e) => warn!("Profile lookup for '{}' failed: {:#}", user_id, e),
        }
        request
    }

    /// Run every routed agent concurrently and wait for all of them. With a
    /// single routed agent its failure propagates; with several, failed agents
    /// are dropped and the request fails only when every one of them failed.
    async fn fan_out(
        &self,
        routed: &[Topic],
        message: &str,
        ctx: &AgentContext,
    ) -> Result<Vec<AgentResult>> {
        let mut handles = Vec::with_capacity(routed.len());
        for topic in routed {
            let responder = self
                .responders
                .get(topic)
                .cloned()
                .ok_or_else(|| anyhow!("No responder registered for topic '{}'", topic))?;
            let message = message.to_string();
            let ctx = ctx.clone();
            let topic = *topic;
            handles.push((
                topic,
                tokio::spawn(async move { responder.respond(&message, &ctx).await }),
            ));
        }

        let single = handles.len() == 1;
        let mut results = Vec::with_capacity(handles.len());
        let mut failures = Vec::new();

        for (topic, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => Err(anyhow!("Agent task panicked: {}", e)),
            };
            match outcome {
                Ok(result) => {
                    debug_assert_eq!(result.agent, topic);
                    results.push(result);
                }
                Err(e) => {
                    if single {
                        return Err(e.context(format!("Agent '{}' failed", topic)));
                    }
                    warn!("Agent '{}' failed, continuing without it: {:#}", topic, e);
                    failures.push(topic);
                }
            }
        }

        if results.is_empty() {
            return Err(anyhow!(
                "All routed agents failed: {:?}",
                failures.iter().map(|t| t.agent_name()).collect::<Vec<_>>()
            ));
        }
        debug!(
            "Fan-out complete: {} of {} agents answered",
            results.len(),
            routed.len()
        );
        Ok(results)
    }

    /// One extra call to fuse multiple answers. If it fails the labeled texts
    /// are concatenated instead — the agent work already succeeded.
    async fn synthesize(&self, results: &[AgentResult], target: Language) -> String {
        let labeled: Vec<String> = results
            .iter()
            .map(|r| format!("[{}]: {}", r.agent.agent_name(), r.response))
            .collect();

        match self.synthesizer.summarize(&labeled, target).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Synthesis failed, concatenating agent answers: {:#}", e);
                labeled.join("\n\n")
            }
        }
    }
}
