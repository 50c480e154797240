use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use tracing::info;

use axum::Router;
use clap::{Parser, Subcommand};
use http::{HeaderName, Method, header::CONTENT_TYPE};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use anyhow::{Context, anyhow};

use voicedesk::{
    AudioInput, SpeechConfig, SpeechService, SpeechSettingsUpdate, routes, state::AppState,
};

/// Voicedesk - Chinese text-to-speech and speech-to-text over Azure Speech
#[derive(Parser, Debug)]
#[command(name = "voicedesk")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Subcommand to run (defaults to `serve`)
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the available Chinese voices
    Voices,

    /// Synthesize text into a WAV file
    Speak {
        /// Text to synthesize
        text: String,

        /// Voice to use instead of the configured default
        #[arg(long)]
        voice: Option<String>,

        /// Pitch factor (0.5-2.0)
        #[arg(long)]
        pitch: Option<f64>,

        /// Speaking rate factor (0.5-2.0)
        #[arg(long)]
        rate: Option<f64>,

        /// Volume (0.0-1.0)
        #[arg(long)]
        volume: Option<f64>,

        /// Output WAV file
        #[arg(short = 'o', long = "output", default_value = "speech.wav")]
        output: PathBuf,
    },

    /// Transcribe an audio file (wav, mp3 or ogg)
    Transcribe {
        /// Audio file to transcribe
        file: PathBuf,
    },

    /// Run the HTTP API server
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (must be done before config loading)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Must happen before the first TLS connection
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Failed to install default crypto provider"))?;

    let cli = Cli::parse();

    let config = if let Some(config_path) = cli.config.as_deref() {
        info!("Loading configuration from {}", config_path.display());
        SpeechConfig::from_file(config_path)?
    } else {
        SpeechConfig::from_env()?
    };

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Voices => list_voices(config).await,
        Commands::Speak {
            text,
            voice,
            pitch,
            rate,
            volume,
            output,
        } => {
            let settings = SpeechSettingsUpdate {
                pitch,
                rate,
                volume,
            };
            speak(config, &text, voice.as_deref(), settings, &output).await
        }
        Commands::Transcribe { file } => transcribe(config, &file).await,
        Commands::Serve => serve(config).await,
    }
}

async fn list_voices(config: SpeechConfig) -> anyhow::Result<()> {
    let service = SpeechService::new(config)?;
    let voices = service.list_voices().await?;

    if voices.is_empty() {
        println!("No Chinese voices available for this region");
        return Ok(());
    }

    for voice in &voices {
        println!(
            "{:<36} {:<8} {:<12} {:<8} {}",
            voice.id,
            voice.locale,
            voice.display_name,
            voice.gender.as_str(),
            voice.voice_kind.as_str()
        );
    }
    println!("{} voice(s)", voices.len());
    Ok(())
}

async fn speak(
    config: SpeechConfig,
    text: &str,
    voice: Option<&str>,
    settings: SpeechSettingsUpdate,
    output: &Path,
) -> anyhow::Result<()> {
    let mut service = SpeechService::new(config)?;
    if let Some(voice) = voice {
        service.set_voice(voice);
    }
    service.set_settings(settings);

    let audio = service.synthesize(text).await?;
    tokio::fs::write(output, audio.as_bytes())
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    match audio.wav_info() {
        Some(info) => println!(
            "Wrote {} ({} bytes, {} Hz, {} ms)",
            output.display(),
            audio.len(),
            info.sample_rate,
            info.duration_ms
        ),
        None => println!("Wrote {} ({} bytes)", output.display(), audio.len()),
    }
    Ok(())
}

async fn transcribe(config: SpeechConfig, file: &Path) -> anyhow::Result<()> {
    let service = SpeechService::new(config)?;

    let audio = AudioInput::from_path(file).await?;
    audio.validate()?;

    let text = service.recognize(&audio).await?;
    if text.is_empty() {
        println!("(no speech recognized)");
    } else {
        println!("{text}");
    }
    Ok(())
}

fn cors_layer(origins: Option<&str>) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::OPTIONS,
    ];

    match origins {
        Some("*") => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers([CONTENT_TYPE])
            .allow_credentials(false),
        Some(origins) => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(methods)
                .allow_headers([CONTENT_TYPE])
                .expose_headers([HeaderName::from_static("content-length")])
        }
        None => {
            // No allow_origin: browsers block cross-origin requests
            info!(
                "CORS not configured, defaulting to same-origin only. \
                 Set CORS_ALLOWED_ORIGINS to enable cross-origin access."
            );
            CorsLayer::new()
                .allow_methods(methods)
                .allow_headers([CONTENT_TYPE])
        }
    }
}

async fn serve(config: SpeechConfig) -> anyhow::Result<()> {
    let cors = cors_layer(config.cors_allowed_origins.as_deref());

    let app_state = AppState::new(config)?;
    let address = app_state.address().await;

    let security_headers = tower::ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            http::header::X_CONTENT_TYPE_OPTIONS,
            http::HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            http::header::X_FRAME_OPTIONS,
            http::HeaderValue::from_static("DENY"),
        ));

    let app: Router = routes::api::create_api_router()
        .with_state(app_state)
        .layer(cors)
        .layer(security_headers);

    let socket_addr: SocketAddr = address
        .parse()
        .map_err(|e| anyhow!("Invalid server address '{}': {}", address, e))?;

    info!("Server listening on http://{}", socket_addr);
    let listener = TcpListener::bind(&socket_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
