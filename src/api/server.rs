//! API Server Module
//!
//! Maps each endpoint 1:1 onto a `Registry` operation and each
//! `RegistryError` onto an HTTP status with a `{"message": ...}` body.

use crate::{
    config::Config,
    error::RegistryError,
    registry::Registry,
    types::{
        CommonStudentsResponse, ErrorResponse, NotificationRequest, RecipientsResponse,
        RegisterRequest, SuspendRequest,
    },
};
use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Shared application state handed to every request handler
#[derive(Clone)]
pub struct AppState {
    registry: Arc<Registry>,
}

impl AppState {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }
}

/// The main API server struct
///
/// Encapsulates the server configuration and application state.
pub struct Server {
    config: Config,
    state: AppState,
}

impl Server {
    /// Creates a new API server instance
    ///
    /// # Arguments
    /// * `config` - Server configuration (host, port, etc.)
    /// * `registry` - The connected registration store
    pub fn new(config: Config, registry: Registry) -> Self {
        Self {
            config,
            state: AppState::new(registry),
        }
    }

    /// Binds to the configured host and port and serves requests until the
    /// process stops
    pub async fn start(self) -> anyhow::Result<()> {
        let app = router(self.state);

        let addr = format!("{}:{}", self.config.api.host, self.config.api.port);
        info!("API server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// Builds the `/api` router over the given state
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/register", post(handle_register))
        .route("/api/commonstudents", get(handle_common_students))
        .route("/api/suspend", post(handle_suspend))
        .route(
            "/api/retrievefornotifications",
            post(handle_retrieve_for_notifications),
        )
        .with_state(state)
}

impl IntoResponse for RegistryError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            RegistryError::Validation(msg) => {
                warn!("Rejected request: {}", msg);
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            RegistryError::NotFound(msg) => {
                warn!("Lookup failed: {}", msg);
                (StatusCode::NOT_FOUND, msg.clone())
            }
            RegistryError::Storage(e) => {
                error!("Storage failure: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };
        (status, Json(ErrorResponse { message })).into_response()
    }
}

impl From<JsonRejection> for RegistryError {
    fn from(rejection: JsonRejection) -> Self {
        RegistryError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for RegistryError {
    fn from(rejection: QueryRejection) -> Self {
        RegistryError::Validation(rejection.body_text())
    }
}

/// `POST /api/register`
async fn handle_register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<StatusCode, RegistryError> {
    let Json(request) = payload?;
    info!(
        "Register {} student(s) under {}",
        request.students.len(),
        request.teacher
    );

    state
        .registry
        .register(&request.teacher, &request.students)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/commonstudents?teacher=a&teacher=b`
///
/// The query is read as raw pairs so that `teacher` may repeat.
async fn handle_common_students(
    State(state): State<AppState>,
    params: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<CommonStudentsResponse>, RegistryError> {
    let Query(params) = params?;
    let teachers: Vec<String> = params
        .into_iter()
        .filter(|(key, _)| key == "teacher")
        .map(|(_, value)| value)
        .collect();
    if teachers.is_empty() {
        return Err(RegistryError::Validation(
            "query parameter `teacher` is required".to_string(),
        ));
    }
    info!("Common students for {:?}", teachers);

    let students = state.registry.common_students(&teachers).await?;
    Ok(Json(CommonStudentsResponse { students }))
}

/// `POST /api/suspend`
async fn handle_suspend(
    State(state): State<AppState>,
    payload: Result<Json<SuspendRequest>, JsonRejection>,
) -> Result<StatusCode, RegistryError> {
    let Json(request) = payload?;
    info!("Suspend {}", request.student);

    state.registry.suspend(&request.student).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/retrievefornotifications`
async fn handle_retrieve_for_notifications(
    State(state): State<AppState>,
    payload: Result<Json<NotificationRequest>, JsonRejection>,
) -> Result<Json<RecipientsResponse>, RegistryError> {
    let Json(request) = payload?;
    info!("Notification recipients for {}", request.teacher);

    let recipients = state
        .registry
        .retrieve_for_notifications(&request.teacher, &request.notification)
        .await?;
    Ok(Json(RecipientsResponse { recipients }))
}
