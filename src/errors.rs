use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("language understanding error: {0}")]
    Understanding(String),

    #[error("knowledge base error: {0}")]
    Knowledge(String),

    #[error("scheduler error: {0}")]
    Scheduler(String),

    #[error("messaging error: {0}")]
    Messaging(String),

    #[error("bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Understanding(_) => StatusCode::BAD_GATEWAY,
            AppError::Knowledge(_) => StatusCode::BAD_GATEWAY,
            AppError::Scheduler(_) => StatusCode::BAD_GATEWAY,
            AppError::Messaging(_) => StatusCode::BAD_GATEWAY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
