//! HTTP front end: JSON API plus the static dashboard bundle

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::dashboard::{Dashboard, DashboardViewModel, Submission};
use crate::DashboardError;

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub location: Option<String>,
    /// Client-chosen id (one per tab); newer requests in a session supersede older ones
    pub session: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

/// Failure of a dashboard request, rendered as JSON
#[derive(Debug)]
pub enum ApiError {
    Dashboard(DashboardError),
    Superseded,
}

impl From<DashboardError> for ApiError {
    fn from(error: DashboardError) -> Self {
        Self::Dashboard(error)
    }
}

fn status_for(error: &DashboardError) -> StatusCode {
    match error {
        DashboardError::NotFound { .. } => StatusCode::NOT_FOUND,
        DashboardError::Validation { .. } | DashboardError::InvalidDegree { .. } => {
            StatusCode::BAD_REQUEST
        }
        DashboardError::Fetch { .. } => StatusCode::BAD_GATEWAY,
        DashboardError::TimeResolution { .. }
        | DashboardError::NoMatch { .. }
        | DashboardError::Config { .. }
        | DashboardError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Dashboard(e) => {
                let status = status_for(&e);
                if status.is_server_error() {
                    error!("Dashboard request failed: {}", e);
                } else {
                    warn!("Dashboard request rejected: {}", e);
                }
                let body = ErrorBody {
                    error: e.kind().to_string(),
                    message: e.user_message(),
                };
                (status, body)
            }
            ApiError::Superseded => (
                StatusCode::CONFLICT,
                ErrorBody {
                    error: "superseded".to_string(),
                    message: "A newer request replaced this one.".to_string(),
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

fn api_router(dashboard: Arc<Dashboard>) -> Router {
    Router::new()
        .route("/dashboard", get(get_dashboard))
        .route("/health", get(health))
        .with_state(dashboard)
}

/// Full application router
pub fn router(dashboard: Arc<Dashboard>, static_dir: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api_router(dashboard))
        .fallback_service(ServeDir::new(static_dir))
        .layer(cors)
}

async fn get_dashboard(
    State(dashboard): State<Arc<Dashboard>>,
    Query(params): Query<DashboardQuery>,
) -> Result<Json<DashboardViewModel>, ApiError> {
    let location = params.location.unwrap_or_default();

    let Some(session) = params.session.filter(|s| !s.is_empty()) else {
        return Ok(Json(dashboard.handle_submit(&location).await?));
    };

    match dashboard.submit_in_session(&session, &location).await? {
        Submission::Current(view) => Ok(Json(*view)),
        Submission::Superseded => Err(ApiError::Superseded),
    }
}

async fn health() -> &'static str {
    "ok"
}

pub async fn run(config: &ServerConfig, dashboard: Arc<Dashboard>) -> anyhow::Result<()> {
    let app = router(dashboard, &config.static_dir);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Web server running at http://{}", addr);

    axum::serve(listener, app)
        .await
        .context("Web server terminated unexpectedly")
}
