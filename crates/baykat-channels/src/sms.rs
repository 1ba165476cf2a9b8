//! SMS adapter — Wolof/French command grammar and outbound truncation
//!
//! Inbound bodies may start with a command word: the canonical Wolof set
//! (METEO, JEGGE, NJEG, TOOL, NDIMBAL) or its French aliases (METEO, MALADIE,
//! PRIX, CULTURE, AIDE). The alias table is checked first, so a command typed
//! in French infers `fr` even when the word (METEO) also exists in the Wolof
//! set; only a token native to the Wolof set infers `wo`. Anything else is a
//! plain message, tagged `fr`, and routes normally. The raw body is always
//! what the orchestrator sees — the command only contributes city/language
//! hints.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use baykat_core::orchestrator::Orchestrator;
use baykat_core::types::{Channel, ChatRequest, Language};

/// Outbound budget: two concatenated 160-char GSM segments, not one.
pub const SMS_MAX_LEN: usize = 320;

/// City used when METEO arrives without an argument.
pub const DEFAULT_CITY: &str = "dakar";

const HELP_FR: &str = "Commandes Baykat: METEO <ville> = prévisions, MALADIE <culture> = \
diagnostic, PRIX <culture> = prix du marché, CULTURE <culture> = conseils de culture, \
AIDE = ce message. Vous pouvez aussi poser votre question directement.";

const HELP_WO: &str = "Baykat: METEO <dëkk> = taw ak jawu, JEGGE <tool> = feebar yi, \
NJEG <tool> = njeg mi ci marché, TOOL <tool> = xalaat ci mbey mi, NDIMBAL = bataaxal bii. \
Mën nga laaj sa laaj ci sa làkk.";

/// A recognized SMS command with its argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmsCommand {
    /// Forecast request; city defaults to [`DEFAULT_CITY`].
    Meteo { city: String },
    /// Disease diagnosis, optional crop.
    Jegge { crop: Option<String> },
    /// Market prices, optional crop.
    Njeg { crop: Option<String> },
    /// Growing advice, optional crop.
    Tool { crop: Option<String> },
    /// Help; takes no argument.
    Ndimbal,
    /// No recognized command word; route the body as-is.
    Freeform,
}

/// Result of parsing an inbound body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSms {
    pub command: SmsCommand,
    /// `wo` for a native Wolof command; `fr` for a French alias and for
    /// freeform text — SMS traffic defaults to French unless the command
    /// itself is Wolof.
    pub language: Option<Language>,
}

/// French alias → canonical Wolof command.
fn resolve_alias(token: &str) -> Option<&'static str> {
    match token {
        "METEO" => Some("METEO"),
        "MALADIE" => Some("JEGGE"),
        "PRIX" => Some("NJEG"),
        "CULTURE" => Some("TOOL"),
        "AIDE" => Some("NDIMBAL"),
        _ => None,
    }
}

fn is_canonical(token: &str) -> bool {
    matches!(token, "METEO" | "JEGGE" | "NJEG" | "TOOL" | "NDIMBAL")
}

impl ParsedSms {
    /// Parse an inbound body. Never fails: an unrecognized first token means
    /// freeform, tagged `fr`.
    pub fn parse(body: &str) -> Self {
        let trimmed = body.trim();
        let Some(first) = trimmed.split_whitespace().next() else {
            return Self {
                command: SmsCommand::Freeform,
                language: Some(Language::Fr),
            };
        };
        let token = first.to_uppercase();

        let (canonical, language) = if let Some(canonical) = resolve_alias(&token) {
            (canonical, Language::Fr)
        } else if is_canonical(&token) {
            (token.as_str(), Language::Wo)
        } else {
            return Self {
                command: SmsCommand::Freeform,
                language: Some(Language::Fr),
            };
        };

        let arg = trimmed[first.len()..].trim().to_lowercase();
        let arg = (!arg.is_empty()).then_some(arg);

        let command = match canonical {
            "METEO" => SmsCommand::Meteo {
                city: arg.unwrap_or_else(|| DEFAULT_CITY.to_string()),
            },
            "JEGGE" => SmsCommand::Jegge { crop: arg },
            "NJEG" => SmsCommand::Njeg { crop: arg },
            "TOOL" => SmsCommand::Tool { crop: arg },
            _ => SmsCommand::Ndimbal,
        };

        Self {
            command,
            language: Some(language),
        }
    }

    /// City hint the command contributes to the request, if any.
    fn city(&self) -> Option<String> {
        match &self.command {
            SmsCommand::Meteo { city } => Some(city.clone()),
            _ => None,
        }
    }
}

/// Truncate to the SMS budget, preferring a word boundary, with a trailing
/// ellipsis marker. Counts characters, not bytes — accented French fits badly
/// otherwise.
pub fn truncate_sms(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= SMS_MAX_LEN {
        return text.to_string();
    }

    let cut = SMS_MAX_LEN - 3;
    let head: String = chars[..cut].iter().collect();
    let kept = match head.rfind(' ') {
        Some(space) if space > 0 => head[..space].trim_end(),
        _ => head.as_str(),
    };
    format!("{}...", kept)
}

/// Inbound SMS webhook payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundSms {
    pub from: String,
    pub body: String,
}

/// Reply handed back to the SMS provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundSms {
    pub to: String,
    pub message: String,
    pub language: Language,
    pub agents_used: Vec<String>,
}

/// Build the orchestration request for an inbound SMS. The sender number is
/// both the user ID and the session ID, so replies to the same number stay in
/// one conversation.
fn build_request(inbound: &InboundSms, parsed: &ParsedSms) -> ChatRequest {
    let mut request = ChatRequest::new(inbound.body.clone())
        .with_channel(Channel::Sms)
        .with_user_id(inbound.from.clone())
        .with_session_id(inbound.from.clone());
    request.city = parsed.city();
    request.language = parsed.language;
    request
}

/// SMS front door: parse, orchestrate, truncate. Never surfaces a protocol
/// error — a failed request becomes a short apology in the inferred language.
pub struct SmsChannel {
    orchestrator: Arc<Orchestrator>,
}

impl SmsChannel {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self { orchestrator }
    }

    pub async fn handle(&self, inbound: InboundSms) -> OutboundSms {
        let parsed = ParsedSms::parse(&inbound.body);
        info!("SMS from {}: {:?}", inbound.from, parsed.command);

        // Help is answered locally; no agent has anything to add.
        if parsed.command == SmsCommand::Ndimbal {
            let language = parsed.language.unwrap_or_default();
            let message = match language {
                Language::Wo => HELP_WO,
                _ => HELP_FR,
            };
            return OutboundSms {
                to: inbound.from,
                message: truncate_sms(message),
                language,
                agents_used: Vec::new(),
            };
        }

        match self.orchestrator.orchestrate(build_request(&inbound, &parsed)).await {
            Ok(result) => OutboundSms {
                to: inbound.from,
                message: truncate_sms(&result.response),
                language: result.language,
                agents_used: result.agents_used,
            },
            Err(e) => {
                warn!("SMS request from {} failed: {:#}", inbound.from, e);
                let language = parsed.language.unwrap_or_default();
                let message = match language {
                    Language::Wo => "Jàmm rekk, ab njuumte am na. Jéemaatal ci kanam.",
                    _ => "Désolé, une erreur est survenue. Réessayez dans un instant.",
                };
                OutboundSms {
                    to: inbound.from,
                    message: message.to_string(),
                    language,
                    agents_used: Vec::new(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use baykat_core::orchestrator::Synthesis;
    use baykat_core::types::{AgentContext, AgentResult, Topic};
    use baykat_core::Responder;

    #[test]
    fn test_parse_meteo_with_city() {
        let parsed = ParsedSms::parse("METEO kaolack");
        assert_eq!(
            parsed.command,
            SmsCommand::Meteo {
                city: "kaolack".to_string()
            }
        );
        assert_eq!(parsed.language, Some(Language::Fr));
    }

    #[test]
    fn test_parse_meteo_defaults_city() {
        let parsed = ParsedSms::parse("METEO");
        assert_eq!(
            parsed.command,
            SmsCommand::Meteo {
                city: DEFAULT_CITY.to_string()
            }
        );
    }

    #[test]
    fn test_parse_wolof_command_infers_wolof() {
        let parsed = ParsedSms::parse("JEGGE");
        assert_eq!(parsed.command, SmsCommand::Jegge { crop: None });
        assert_eq!(parsed.language, Some(Language::Wo));

        let parsed = ParsedSms::parse("njeg Mangue");
        assert_eq!(
            parsed.command,
            SmsCommand::Njeg {
                crop: Some("mangue".to_string())
            }
        );
        assert_eq!(parsed.language, Some(Language::Wo));
    }

    #[test]
    fn test_parse_french_alias_resolves_and_infers_french() {
        let parsed = ParsedSms::parse("PRIX arachide");
        assert_eq!(
            parsed.command,
            SmsCommand::Njeg {
                crop: Some("arachide".to_string())
            }
        );
        assert_eq!(parsed.language, Some(Language::Fr));

        let parsed = ParsedSms::parse("MALADIE mil");
        assert_eq!(
            parsed.command,
            SmsCommand::Jegge {
                crop: Some("mil".to_string())
            }
        );
    }

    #[test]
    fn test_parse_multiword_argument_lowercased() {
        let parsed = ParsedSms::parse("CULTURE Tomate Cerise");
        assert_eq!(
            parsed.command,
            SmsCommand::Tool {
                crop: Some("tomate cerise".to_string())
            }
        );
    }

    #[test]
    fn test_parse_unrecognized_token_is_freeform_tagged_french() {
        let parsed = ParsedSms::parse("Quand semer le mil?");
        assert_eq!(parsed.command, SmsCommand::Freeform);
        assert_eq!(parsed.language, Some(Language::Fr));

        let empty = ParsedSms::parse("");
        assert_eq!(empty.command, SmsCommand::Freeform);
        assert_eq!(empty.language, Some(Language::Fr));
        assert_eq!(ParsedSms::parse("   ").command, SmsCommand::Freeform);
    }

    #[test]
    fn test_build_request_reuses_sender_as_session() {
        let inbound = InboundSms {
            from: "+221771234567".to_string(),
            body: "METEO kaolack".to_string(),
        };
        let parsed = ParsedSms::parse(&inbound.body);
        let request = build_request(&inbound, &parsed);

        assert_eq!(request.session_id.as_deref(), Some("+221771234567"));
        assert_eq!(request.user_id.as_deref(), Some("+221771234567"));
        assert_eq!(request.city.as_deref(), Some("kaolack"));
        assert_eq!(request.language, Some(Language::Fr));
    }

    #[test]
    fn test_truncate_long_text_fits_budget_with_ellipsis() {
        let long = "a".repeat(400);
        let cut = truncate_sms(&long);
        assert_eq!(cut.chars().count(), 320);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_truncate_short_text_passes_through() {
        let short = "b".repeat(200);
        assert_eq!(truncate_sms(&short), short);
        assert_eq!(truncate_sms(""), "");
    }

    #[test]
    fn test_truncate_prefers_word_boundary() {
        let words = "pluie demain sur Kaolack ".repeat(20);
        let cut = truncate_sms(&words);
        assert!(cut.chars().count() <= 320);
        assert!(cut.ends_with("..."));
        // Cut lands between words, never inside one.
        let body = cut.trim_end_matches("...");
        assert!(words.starts_with(body));
        assert!(!body.ends_with(' '));
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        let accented = "é".repeat(400);
        let cut = truncate_sms(&accented);
        assert_eq!(cut.chars().count(), 320);
    }

    // ── SmsChannel end-to-end with stubbed agents ──

    struct CannedResponder {
        topic: Topic,
        text: Option<String>,
    }

    #[async_trait]
    impl Responder for CannedResponder {
        fn topic(&self) -> Topic {
            self.topic
        }

        async fn respond(&self, _message: &str, ctx: &AgentContext) -> Result<AgentResult> {
            match &self.text {
                Some(text) => Ok(AgentResult {
                    agent: self.topic,
                    response: text.clone(),
                    language: ctx.language,
                }),
                None => Err(anyhow!("canned failure")),
            }
        }
    }

    struct NoSynthesis;

    #[async_trait]
    impl Synthesis for NoSynthesis {
        async fn summarize(&self, labeled: &[String], _target: Language) -> Result<String> {
            Ok(labeled.join("\n\n"))
        }
    }

    fn channel_with(weather_text: Option<&str>) -> SmsChannel {
        let orchestrator = Orchestrator::new(
            vec![
                Arc::new(CannedResponder {
                    topic: Topic::Weather,
                    text: weather_text.map(String::from),
                }),
                Arc::new(CannedResponder {
                    topic: Topic::Agro,
                    text: Some("semez maintenant".to_string()),
                }),
                Arc::new(CannedResponder {
                    topic: Topic::Market,
                    text: Some("300 FCFA/kg".to_string()),
                }),
            ],
            Arc::new(NoSynthesis),
        );
        SmsChannel::new(Arc::new(orchestrator))
    }

    #[tokio::test]
    async fn test_handle_meteo_command() {
        let channel = channel_with(Some("Pluie demain à Kaolack, arrosez moins."));
        let reply = channel
            .handle(InboundSms {
                from: "+221771234567".to_string(),
                body: "METEO kaolack".to_string(),
            })
            .await;

        assert_eq!(reply.to, "+221771234567");
        assert_eq!(reply.message, "Pluie demain à Kaolack, arrosez moins.");
        assert_eq!(reply.language, Language::Fr);
        assert_eq!(reply.agents_used, vec!["weather"]);
    }

    #[tokio::test]
    async fn test_handle_help_answers_locally() {
        let channel = channel_with(Some("unused"));
        let reply = channel
            .handle(InboundSms {
                from: "+221770000000".to_string(),
                body: "NDIMBAL".to_string(),
            })
            .await;

        assert_eq!(reply.language, Language::Wo);
        assert!(reply.agents_used.is_empty());
        assert!(reply.message.contains("NJEG"));

        let reply = channel
            .handle(InboundSms {
                from: "+221770000000".to_string(),
                body: "AIDE".to_string(),
            })
            .await;
        assert_eq!(reply.language, Language::Fr);
        assert!(reply.message.contains("METEO"));
    }

    #[tokio::test]
    async fn test_handle_failure_stays_polite() {
        // Weather is the only routed agent and it fails.
        let channel = channel_with(None);
        let reply = channel
            .handle(InboundSms {
                from: "+221771234567".to_string(),
                body: "METEO kaolack".to_string(),
            })
            .await;

        assert!(reply.agents_used.is_empty());
        assert!(reply.message.contains("Réessayez"));
        assert!(reply.message.chars().count() <= SMS_MAX_LEN);
    }

    #[tokio::test]
    async fn test_handle_freeform_routes_normally() {
        let channel = channel_with(Some("unused"));
        let reply = channel
            .handle(InboundSms {
                from: "+221771234567".to_string(),
                body: "Quel est le prix de l'arachide à Kaolack?".to_string(),
            })
            .await;

        assert_eq!(reply.agents_used, vec!["market"]);
        assert_eq!(reply.message, "300 FCFA/kg");
        assert_eq!(reply.language, Language::Fr);
    }
}
