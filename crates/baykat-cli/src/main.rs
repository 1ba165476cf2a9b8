use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;

use config::BaykatConfig;

use baykat_core::api::ApiClient;
use baykat_core::diagnosis::PhotoDiagnoser;
use baykat_core::orchestrator::{ApiSynthesizer, Orchestrator};
use baykat_core::profile::InMemoryProfileStore;
use baykat_core::types::{Channel, ChatRequest, Language};
use baykat_core::weather::WeatherService;
use baykat_core::{AgroAgent, MarketAgent, Responder, WeatherAgent};
use baykat_gateway::GatewayServer;

#[derive(Parser)]
#[command(name = "baykat")]
#[command(version)]
#[command(about = "Baykat — agricultural advice for Senegalese farmers")]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway
    Serve,

    /// Ask a one-shot question from the terminal
    Ask {
        /// The question to send
        message: String,

        /// City hint for the weather agent
        #[arg(long)]
        city: Option<String>,

        /// Answer language (fr, en, wo); detected when omitted
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Initialize config directory and default config
    Init,

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Init => cmd_init().await,
        Commands::Config => cmd_config(&cli.config),
        Commands::Serve => cmd_serve(&cli.config).await,
        Commands::Ask {
            message,
            city,
            language,
        } => cmd_ask(&cli.config, &message, city, language).await,
    }
}

async fn cmd_init() -> Result<()> {
    let config_dir = config::config_dir();
    tokio::fs::create_dir_all(&config_dir)
        .await
        .with_context(|| format!("Failed to create config dir: {}", config_dir.display()))?;

    let config_path = config_dir.join("config.toml");
    if config_path.exists() {
        warn!("Config already exists at {}", config_path.display());
    } else {
        let default_config = include_str!("../../../config/default.toml");
        tokio::fs::write(&config_path, default_config).await?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&config_path, std::fs::Permissions::from_mode(0o600))
                .await?;
        }
        info!("Created default config at {}", config_path.display());
    }

    println!("Baykat initialized at {}", config_dir.display());
    println!(
        "Set ANTHROPIC_API_KEY in your environment, then run `baykat serve`."
    );
    Ok(())
}

fn cmd_config(config_path: &Option<PathBuf>) -> Result<()> {
    let cfg = BaykatConfig::load(config_path)?;
    println!("{}", toml::to_string_pretty(&cfg)?);
    Ok(())
}

/// Wire the agents, synthesizer, weather service, and photo diagnoser from
/// the config.
fn build_orchestrator(
    cfg: &BaykatConfig,
) -> (Arc<Orchestrator>, Arc<WeatherService>, Arc<PhotoDiagnoser>) {
    let fast_api = ApiClient::new(
        cfg.anthropic.api_key.clone(),
        Some(cfg.agent.fast_model.clone()),
    )
    .with_base_url(cfg.anthropic.base_url.clone());

    let synthesis_api = ApiClient::new(
        cfg.anthropic.api_key.clone(),
        Some(cfg.agent.orchestrator_model.clone()),
    )
    .with_base_url(cfg.anthropic.base_url.clone());

    let weather = Arc::new(WeatherService::new());

    let responders: Vec<Arc<dyn Responder>> = vec![
        Arc::new(WeatherAgent::new(fast_api.clone(), weather.clone())),
        Arc::new(AgroAgent::new(fast_api.clone())),
        Arc::new(MarketAgent::new(fast_api.clone())),
    ];

    let orchestrator = Orchestrator::new(responders, Arc::new(ApiSynthesizer::new(synthesis_api)))
        .with_profiles(Arc::new(InMemoryProfileStore::new()));

    (
        Arc::new(orchestrator),
        weather,
        Arc::new(PhotoDiagnoser::new(fast_api)),
    )
}

async fn cmd_serve(config_path: &Option<PathBuf>) -> Result<()> {
    let cfg = BaykatConfig::load(config_path)?;
    let (orchestrator, weather, diagnosis) = build_orchestrator(&cfg);

    let bind: SocketAddr = format!("{}:{}", cfg.server.bind, cfg.server.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", cfg.server.bind, cfg.server.port))?;

    info!(
        "Starting baykat gateway on {} (fast model: {})",
        bind, cfg.agent.fast_model
    );
    GatewayServer::new(bind, orchestrator, weather, diagnosis)
        .run()
        .await
}

async fn cmd_ask(
    config_path: &Option<PathBuf>,
    message: &str,
    city: Option<String>,
    language: Option<String>,
) -> Result<()> {
    let cfg = BaykatConfig::load(config_path)?;
    let (orchestrator, _weather, _diagnosis) = build_orchestrator(&cfg);

    let mut request = ChatRequest::new(message).with_channel(Channel::Web);
    request.city = city;
    request.language = language.as_deref().map(Language::from_code);

    let result = orchestrator.orchestrate(request).await?;

    println!("{}", result.response);
    println!();
    println!(
        "[{} | agents: {}]",
        result.language,
        result.agents_used.join(", ")
    );
    Ok(())
}
