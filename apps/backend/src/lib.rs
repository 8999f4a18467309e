pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use flashcard_core::audio::{AssetBackend, SpeechSynthesizer};
use flashcard_core::{AudioEngine, Corpus, QuestionGenerator};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::services::{
    CommandAssetBackend, CommandSpeechSynthesizer, ProgressStore, SessionStore,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub corpus: Arc<Corpus>,
    pub engine: Arc<AudioEngine>,
    pub generator: Arc<QuestionGenerator>,
    pub sessions: Arc<SessionStore>,
    pub progress: Arc<ProgressStore>,
}

impl AppState {
    /// State with native playback backends probed when local playback is on.
    pub fn new(config: Config, corpus: Corpus) -> Self {
        let (assets, speech) = if config.local_playback {
            (
                CommandAssetBackend::probe().map(|b| Arc::new(b) as Arc<dyn AssetBackend>),
                CommandSpeechSynthesizer::probe().map(|s| Arc::new(s) as Arc<dyn SpeechSynthesizer>),
            )
        } else {
            (None, None)
        };
        let engine = AudioEngine::new(config.audio_config(), assets, speech);
        Self::with_engine(config, corpus, engine)
    }

    pub fn with_engine(config: Config, corpus: Corpus, engine: AudioEngine) -> Self {
        let progress = ProgressStore::new(config.progress_path());
        Self {
            config: Arc::new(config),
            corpus: Arc::new(corpus),
            engine: Arc::new(engine),
            generator: Arc::new(QuestionGenerator::default()),
            sessions: Arc::new(SessionStore::new()),
            progress: Arc::new(progress),
        }
    }
}

/// Build the full router over `state`.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        // Corpus routes
        .route("/api/corpus/{category}", get(routes::corpus::list))
        .route("/api/corpus/{category}/units", get(routes::corpus::units))
        // Audio routes
        .route(
            "/api/audio/{category}/candidates",
            get(routes::audio::candidates),
        )
        .route("/api/pronounce", post(routes::pronounce::play))
        .route("/api/pronounce/queue", post(routes::pronounce::queue))
        .route("/api/pronounce/stop", post(routes::pronounce::stop))
        .route("/api/pronounce/voices", get(routes::pronounce::voices))
        .route(
            "/api/pronounce/cache",
            get(routes::pronounce::cache).delete(routes::pronounce::clear_cache),
        )
        // Study routes
        .route(
            "/api/study/{category}/pronounce",
            post(routes::study::pronounce),
        )
        // Test routes
        .route("/api/tests", post(routes::tests::create))
        .route(
            "/api/tests/{id}",
            get(routes::tests::get).delete(routes::tests::delete),
        )
        .route(
            "/api/tests/{id}/answers/{position}",
            put(routes::tests::submit_answer),
        )
        .route("/api/tests/{id}/score", get(routes::tests::score))
        .route("/api/tests/{id}/retest", post(routes::tests::retest))
        .route("/api/tests/{id}/restart", post(routes::tests::restart))
        // Progress routes
        .route(
            "/api/progress",
            get(routes::progress::get).put(routes::progress::put),
        );

    let audio = ServeDir::new(&state.config.audio_dir);

    Router::new()
        .route("/health", get(health_check))
        .merge(api)
        .nest_service(routes::AUDIO_ROUTE, audio)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    tracing::info!("Loading corpus...");
    let corpus = services::corpus::load(config.corpus_path.as_deref()).await?;

    tracing::info!(
        audio_dir = %config.audio_dir.display(),
        local_playback = config.local_playback,
        "Initializing audio engine..."
    );
    let addr = config.addr();
    let state = AppState::new(config, corpus);
    let app = build_router(state);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
