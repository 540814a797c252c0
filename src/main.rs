use std::sync::Arc;

use diagram_studio::config::{RendererKind, StudioConfig};
use diagram_studio::db::{self, store::SqliteStore};
use diagram_studio::llm::{CompletionClient, GeneratorConfig};
use diagram_studio::render::cli::CliRenderer;
use diagram_studio::render::native::NativeRenderer;
use diagram_studio::render::{DEFAULT_MAX_TEXT_SIZE, DiagramRenderer};
use diagram_studio::services::editor::Editor;
use diagram_studio::services::preferences::Preferences;
use diagram_studio::{routes, state};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = StudioConfig::from_env()?;
    let pool = db::init_pool(&config.database_url).await?;
    let prefs = Arc::new(Preferences::load(Arc::new(SqliteStore::new(pool))).await?);

    let renderer: Arc<dyn DiagramRenderer> = match config.render.renderer {
        RendererKind::Native => Arc::new(NativeRenderer::new()),
        RendererKind::Cli => Arc::new(CliRenderer::new(&config.render.mmdc_path)),
    };
    let generator = Arc::new(CompletionClient::new(GeneratorConfig::from_env())?);

    let editor = Editor::new(renderer, generator, prefs, &config.render);
    if let Err(e) = editor.initialize(DEFAULT_MAX_TEXT_SIZE).await {
        // Not fatal: renders fail fast and the banner shows why.
        tracing::error!(error = %e, "renderer initialization failed");
    }

    let app = routes::app(state::AppState::new(editor));
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    tracing::info!(port = config.port, renderer = ?config.render.renderer, "diagram-studio listening");
    axum::serve(listener, app).await?;
    Ok(())
}
