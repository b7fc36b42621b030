use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Teacher row, identified externally by email
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Teacher {
    pub id: i64,
    pub email: String,
}

/// Student row
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Student {
    pub id: i64,
    pub email: String,
    pub suspended: bool,
}

/// Body of `POST /api/register`
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub teacher: String,
    pub students: Vec<String>,
}

/// Body of `POST /api/suspend`
#[derive(Debug, Clone, Deserialize)]
pub struct SuspendRequest {
    pub student: String,
}

/// Body of `POST /api/retrievefornotifications`
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationRequest {
    pub teacher: String,
    pub notification: String,
}

/// Response of `GET /api/commonstudents`
#[derive(Debug, Clone, Serialize)]
pub struct CommonStudentsResponse {
    pub students: Vec<String>,
}

/// Response of `POST /api/retrievefornotifications`
#[derive(Debug, Clone, Serialize)]
pub struct RecipientsResponse {
    pub recipients: Vec<String>,
}

/// Error body returned on any non-2xx response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}
