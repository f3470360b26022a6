//! Onboarding Forms API
//!
//! Fills the hotel onboarding paperwork (I-9, W-4, direct deposit, health
//! insurance) from JSON and returns preview or signed PDFs:
//!
//! - Form listing with the field layout of each template
//! - Preview and signed generation
//! - Signing of a previously generated PDF
//!
//! Templates are read from `--template-dir` and checked against the field
//! registry before the server accepts traffic.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use clap::Parser;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod error;
mod handlers;
mod models;
mod state;

use state::{AppState, ServerConfig};

/// Command-line arguments for the onboarding API
#[derive(Parser, Debug)]
#[command(name = "onboarding-api")]
#[command(about = "Fills and signs hotel onboarding PDFs")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "8000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, env = "ONBOARDING_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Directory holding one PDF template per form
    #[arg(long, env = "ONBOARDING_TEMPLATE_DIR", default_value = "templates")]
    template_dir: PathBuf,

    /// Print today's date when a signature date cannot be parsed
    #[arg(long, env = "ONBOARDING_DATE_FALLBACK")]
    allow_date_fallback: bool,

    /// Write blank placeholder templates for missing forms (development only)
    #[arg(long)]
    write_blank_templates: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

pub fn app(state: Arc<AppState>) -> Router {
    // CORS configuration for web clients
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Form endpoints
        .route("/api/forms", get(handlers::list_forms))
        .route("/api/forms/:form_type/preview", post(handlers::preview_form))
        .route("/api/forms/:form_type/sign", post(handlers::sign_form))
        .route("/api/forms/:form_type/signature", post(handlers::add_signature))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(format!(
            "onboarding_api={level},onboarding_forms={level},tower_http=debug"
        ))
    })?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Initializing onboarding forms...");
    let config = ServerConfig {
        template_dir: args.template_dir,
        allow_date_fallback: args.allow_date_fallback,
        write_blank_templates: args.write_blank_templates,
    };
    let state = Arc::new(AppState::new(&config)?);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app(state)).await?;

    Ok(())
}
