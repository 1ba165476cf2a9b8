//! Crop-photo diagnosis — one vision call, no tools
//!
//! A farmer sends a photo of a sick plant; the model identifies the crop,
//! assesses its health, and suggests locally available treatments. This path
//! bypasses routing entirely: there is exactly one call and it always goes to
//! the vision-capable model.

use anyhow::{Context, Result, anyhow};
use tracing::debug;

use crate::api::{ApiClient, ApiMessage, ContentBlock, ImageSource, MessageContent, collect_text};
use crate::types::Language;

const SYSTEM_PROMPT: &str = r#"Tu es un conseiller agricole expert pour les agriculteurs sénégalais.

Analyse cette photo de culture/plante et fournis:
1. **Culture identifiée** (si reconnaissable)
2. **État de santé** - la plante est-elle saine ou montre-t-elle des signes de maladie ou de stress?
3. **Diagnostic** - si malade, la maladie ou le ravageur le plus probable
4. **Symptômes observés** - décris ce que tu vois sur l'image
5. **Traitement** - étapes pratiques avec des moyens disponibles localement (méthodes traditionnelles et biologiques comprises)
6. **Prévention** - comment éviter cela à l'avenir

Sois précis, pratique et adapté au contexte (climat local, produits disponibles).
Réponds dans la langue demandée."#;

/// Media types the vision API accepts; anything else is sent as JPEG.
const SUPPORTED_MEDIA_TYPES: &[&str] =
    &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Coerce a caller-supplied content type to one the vision API accepts.
/// Phone uploads often arrive with a wrong or missing type; JPEG is the safe
/// guess.
pub fn normalize_media_type(media_type: &str) -> &'static str {
    SUPPORTED_MEDIA_TYPES
        .iter()
        .find(|mt| **mt == media_type)
        .copied()
        .unwrap_or("image/jpeg")
}

fn request_text(language: Language) -> String {
    format!("Analyse cette photo de culture. [Langue: {}]", language.label())
}

/// Vision diagnosis backed by the Anthropic API.
pub struct PhotoDiagnoser {
    api: ApiClient,
}

impl PhotoDiagnoser {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api: api.with_max_tokens(1024),
        }
    }

    /// Diagnose a base64-encoded crop photo, answering in `language`.
    pub async fn diagnose(
        &self,
        image_base64: &str,
        media_type: &str,
        language: Language,
    ) -> Result<String> {
        if image_base64.is_empty() {
            return Err(anyhow!("Empty image payload"));
        }
        let media_type = normalize_media_type(media_type);
        debug!(
            "Diagnosing crop photo ({} base64 chars, {})",
            image_base64.len(),
            media_type
        );

        let messages = vec![ApiMessage {
            role: "user".to_string(),
            content: MessageContent::Blocks(vec![
                ContentBlock::Image {
                    source: ImageSource::base64(media_type, image_base64),
                },
                ContentBlock::Text {
                    text: request_text(language),
                },
            ]),
        }];

        let response = self
            .api
            .chat(&messages, &[], SYSTEM_PROMPT)
            .await
            .context("Vision diagnosis call failed")?;

        let text = collect_text(&response.content);
        if text.is_empty() {
            return Err(anyhow!("No text response from assistant"));
        }
        Ok(text)
    }
}
