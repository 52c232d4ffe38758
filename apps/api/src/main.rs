mod config;
mod errors;
mod explanation;
mod models;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::explanation::dialect::ReportDialect;
use crate::explanation::report_parser::ReportParser;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Recruit API v{}", env!("CARGO_PKG_VERSION"));

    let dialect = load_dialect(&config)?;
    info!(
        "Report dialect: section '{}', {} fields",
        dialect.section_marker,
        dialect.fields.len()
    );
    let report_parser = Arc::new(ReportParser::new(dialect).context("invalid report dialect")?);

    let state = AppState {
        config: config.clone(),
        report_parser,
    };

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Built-in dialect unless `REPORT_DIALECT_PATH` points at a JSON one.
fn load_dialect(config: &Config) -> Result<ReportDialect> {
    match &config.report_dialect_path {
        Some(path) => {
            info!("Loading report dialect from {}", path.display());
            ReportDialect::from_json_file(path)
                .with_context(|| format!("failed to load report dialect {}", path.display()))
        }
        None => Ok(ReportDialect::standard()),
    }
}
