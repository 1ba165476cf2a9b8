//! Gateway HTTP server — Axum routes for chat, streaming, SMS, and data

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, KeepAliveStream, Sse};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use serde::Deserialize;

use baykat_channels::sms::{InboundSms, SmsChannel};
use baykat_core::diagnosis::PhotoDiagnoser;
use baykat_core::orchestrator::Orchestrator;
use baykat_core::types::{ChatRequest, Language};
use baykat_core::weather::{WeatherError, WeatherService, available_cities};
use baykat_core::{data, weather};

use crate::protocol::{StreamEvent, WORDS_PER_TOKEN, chunk_text};

/// Pause between token flushes, for a readable streaming cadence.
const STREAM_DELAY: Duration = Duration::from_millis(30);

/// Shared state for all handlers
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub sms: Arc<SmsChannel>,
    pub weather: Arc<WeatherService>,
    pub diagnosis: Arc<PhotoDiagnoser>,
    pub start_time: std::time::Instant,
}

/// The gateway server
pub struct GatewayServer {
    state: AppState,
    bind: SocketAddr,
}

impl GatewayServer {
    pub fn new(
        bind: SocketAddr,
        orchestrator: Arc<Orchestrator>,
        weather: Arc<WeatherService>,
        diagnosis: Arc<PhotoDiagnoser>,
    ) -> Self {
        let state = AppState {
            sms: Arc::new(SmsChannel::new(orchestrator.clone())),
            orchestrator,
            weather,
            diagnosis,
            start_time: std::time::Instant::now(),
        };
        Self { state, bind }
    }

    /// Build the Axum router
    pub fn router(&self) -> Router {
        Router::new()
            .route("/chat", post(chat_handler))
            .route("/chat/stream", post(stream_handler))
            .route("/sms/incoming", post(sms_handler))
            .route("/diagnose", post(diagnose_handler))
            .route("/weather/{city}", get(weather_handler))
            .route("/crops", get(crops_handler))
            .route("/crops/{name}", get(crop_handler))
            .route("/markets", get(markets_handler))
            .route("/zones", get(zones_handler))
            .route("/cities", get(cities_handler))
            .route("/health", get(health_handler))
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Start the server (blocks until shutdown)
    pub async fn run(self) -> anyhow::Result<()> {
        let router = self.router();
        let listener = tokio::net::TcpListener::bind(self.bind).await?;
        info!("Gateway listening on {}", self.bind);
        axum::serve(listener, router).await?;
        Ok(())
    }

    /// Start the server in the background, returning a handle
    pub fn spawn(self) -> tokio::task::JoinHandle<anyhow::Result<()>> {
        tokio::spawn(async move { self.run().await })
    }
}

fn error_response(status: StatusCode, detail: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": detail.into() }))).into_response()
}

// ── Chat ──

async fn chat_handler(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Response {
    match state.orchestrator.orchestrate(request).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => {
            error!("Chat request failed: {:#}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", e))
        }
    }
}

async fn stream_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Sse<KeepAliveStream<ReceiverStream<Result<Event, Infallible>>>> {
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(64);

    tokio::spawn(async move {
        // Routing is deterministic and cheap; announce it before the agents run.
        let routed: Vec<String> = state
            .orchestrator
            .route(&request.message)
            .iter()
            .map(|t| t.agent_name().to_string())
            .collect();
        send_event(&tx, StreamEvent::Routing { agents: routed }).await;

        match state.orchestrator.orchestrate(request).await {
            Ok(result) => {
                for fragment in chunk_text(&result.response, WORDS_PER_TOKEN) {
                    send_event(&tx, StreamEvent::Token { text: fragment }).await;
                    tokio::time::sleep(STREAM_DELAY).await;
                }
                send_event(
                    &tx,
                    StreamEvent::Done {
                        agents_used: result.agents_used,
                        language: result.language,
                    },
                )
                .await;
            }
            Err(e) => {
                error!("Stream request failed: {:#}", e);
                send_event(
                    &tx,
                    StreamEvent::Error {
                        message: format!("{:#}", e),
                    },
                )
                .await;
            }
        }
    });

    Sse::new(ReceiverStream::new(rx)).keep_alive(KeepAlive::default())
}

async fn send_event(tx: &mpsc::Sender<Result<Event, Infallible>>, event: StreamEvent) {
    let sse = Event::default()
        .event(event.name())
        .json_data(&event)
        .unwrap_or_else(|_| Event::default().event(event.name()));
    // A send error just means the client went away.
    let _ = tx.send(Ok(sse)).await;
}

// ── SMS ──

async fn sms_handler(
    State(state): State<AppState>,
    Json(inbound): Json<InboundSms>,
) -> impl IntoResponse {
    Json(state.sms.handle(inbound).await)
}

// ── Photo diagnosis ──

/// Base64-encoded crop photo plus optional hints.
#[derive(Debug, Clone, Deserialize)]
pub struct DiagnoseRequest {
    pub image: String,
    #[serde(default = "default_media_type")]
    pub media_type: String,
    #[serde(default)]
    pub language: Option<Language>,
}

fn default_media_type() -> String {
    "image/jpeg".to_string()
}

async fn diagnose_handler(
    State(state): State<AppState>,
    Json(request): Json<DiagnoseRequest>,
) -> Response {
    if request.image.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Image vide");
    }
    let language = request.language.unwrap_or(Language::En);

    match state
        .diagnosis
        .diagnose(&request.image, &request.media_type, language)
        .await
    {
        Ok(diagnosis) => Json(serde_json::json!({
            "diagnosis": diagnosis,
            "language": language,
            "agents_used": ["vision"],
        }))
        .into_response(),
        Err(e) => {
            error!("Photo diagnosis failed: {:#}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", e))
        }
    }
}

// ── Weather and dataset ──

async fn weather_handler(State(state): State<AppState>, Path(city): Path<String>) -> Response {
    match state.weather.forecast(&city).await {
        Ok(forecast) => Json(forecast).into_response(),
        Err(e @ WeatherError::UnknownCity { .. }) => {
            error_response(StatusCode::NOT_FOUND, e.to_string())
        }
        Err(e) => {
            error!("Weather lookup for '{}' failed: {}", city, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn crops_handler() -> impl IntoResponse {
    Json(data::CROPS)
}

async fn crop_handler(Path(name): Path<String>) -> Response {
    match data::get_crop(&name) {
        Some(crop) => Json(crop).into_response(),
        None => error_response(StatusCode::NOT_FOUND, format!("Culture inconnue: {}", name)),
    }
}

async fn markets_handler() -> impl IntoResponse {
    Json(data::MARKETS)
}

async fn zones_handler() -> impl IntoResponse {
    Json(data::ZONES)
}

async fn cities_handler() -> impl IntoResponse {
    Json(weather::CITIES)
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.start_time.elapsed().as_secs(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use baykat_core::Responder;
    use baykat_core::orchestrator::Synthesis;
    use baykat_core::types::{AgentContext, AgentResult, Language, Topic};
    use futures_util::StreamExt;

    struct EchoResponder(Topic);

    #[async_trait]
    impl Responder for EchoResponder {
        fn topic(&self) -> Topic {
            self.0
        }

        async fn respond(&self, message: &str, ctx: &AgentContext) -> Result<AgentResult> {
            Ok(AgentResult {
                agent: self.0,
                response: format!("réponse {} à: {}", self.0, message),
                language: ctx.language,
            })
        }
    }

    struct JoinSynthesis;

    #[async_trait]
    impl Synthesis for JoinSynthesis {
        async fn summarize(&self, labeled: &[String], _target: Language) -> Result<String> {
            Ok(labeled.join("\n\n"))
        }
    }

    fn test_state() -> AppState {
        let orchestrator = Arc::new(Orchestrator::new(
            vec![
                Arc::new(EchoResponder(Topic::Weather)),
                Arc::new(EchoResponder(Topic::Agro)),
                Arc::new(EchoResponder(Topic::Market)),
            ],
            Arc::new(JoinSynthesis),
        ));
        AppState {
            sms: Arc::new(SmsChannel::new(orchestrator.clone())),
            orchestrator,
            weather: Arc::new(WeatherService::new()),
            diagnosis: Arc::new(PhotoDiagnoser::new(baykat_core::ApiClient::new(
                "test-key".to_string(),
                None,
            ))),
            start_time: std::time::Instant::now(),
        }
    }

    #[tokio::test]
    async fn test_chat_handler_returns_orchestration_result() {
        let response = chat_handler(
            State(test_state()),
            Json(ChatRequest::new("Quel est le prix de l'arachide?")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), 1 << 16)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["agents_used"], serde_json::json!(["market"]));
        assert!(body["response"].as_str().unwrap().contains("réponse market"));
    }

    #[tokio::test]
    async fn test_stream_handler_events_rejoin_to_final_text() {
        let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(64);
        // Drive the same path the handler spawns, without the HTTP layer.
        let state = test_state();
        let request = ChatRequest::new("météo demain");

        let routed: Vec<String> = state
            .orchestrator
            .route(&request.message)
            .iter()
            .map(|t| t.agent_name().to_string())
            .collect();
        send_event(&tx, StreamEvent::Routing { agents: routed }).await;
        let result = state.orchestrator.orchestrate(request).await.unwrap();
        for fragment in chunk_text(&result.response, WORDS_PER_TOKEN) {
            send_event(&tx, StreamEvent::Token { text: fragment }).await;
        }
        send_event(
            &tx,
            StreamEvent::Done {
                agents_used: result.agents_used.clone(),
                language: result.language,
            },
        )
        .await;
        drop(tx);

        let events: Vec<_> = ReceiverStream::new(rx).collect().await;
        assert!(events.len() >= 3);
        // routing first, done last; tokens in between.
        let first = format!("{:?}", events.first().unwrap());
        let last = format!("{:?}", events.last().unwrap());
        assert!(first.contains("routing"));
        assert!(last.contains("done"));
    }

    #[tokio::test]
    async fn test_sms_handler_truncates_and_tags() {
        let response = sms_handler(
            State(test_state()),
            Json(InboundSms {
                from: "+221771112233".to_string(),
                body: "PRIX arachide".to_string(),
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), 1 << 16)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["to"], "+221771112233");
        assert_eq!(body["language"], "fr");
        assert!(body["message"].as_str().unwrap().chars().count() <= 320);
    }

    #[tokio::test]
    async fn test_diagnose_handler_rejects_empty_image() {
        let response = diagnose_handler(
            State(test_state()),
            Json(DiagnoseRequest {
                image: String::new(),
                media_type: default_media_type(),
                language: None,
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_diagnose_request_defaults() {
        let request: DiagnoseRequest =
            serde_json::from_str(r#"{"image": "aGVsbG8="}"#).unwrap();
        assert_eq!(request.media_type, "image/jpeg");
        assert!(request.language.is_none());

        let request: DiagnoseRequest =
            serde_json::from_str(r#"{"image": "aGVsbG8=", "language": "wo"}"#).unwrap();
        assert_eq!(request.language, Some(Language::Wo));
    }

    #[tokio::test]
    async fn test_crop_handler_found_and_not_found() {
        let found = crop_handler(Path("mil".to_string())).await;
        assert_eq!(found.status(), StatusCode::OK);

        let missing = crop_handler(Path("quinoa".to_string())).await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_health_handler_reports_version() {
        let response = health_handler(State(test_state())).await.into_response();
        let bytes = axum::body::to_bytes(response.into_body(), 1 << 16)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert!(body["version"].is_string());
    }

    #[test]
    fn test_unknown_city_message_lists_available() {
        let err = WeatherError::UnknownCity {
            city: "paris".to_string(),
            available: available_cities(),
        };
        let msg = err.to_string();
        assert!(msg.contains("paris"));
        assert!(msg.contains("dakar"));
    }
}
