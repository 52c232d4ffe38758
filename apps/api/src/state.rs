use std::sync::Arc;

use crate::config::Config;
use crate::explanation::report_parser::ReportParser;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Report parser compiled once at startup for the configured dialect.
    pub report_parser: Arc<ReportParser>,
}
