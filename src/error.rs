use axum::{http::StatusCode, response::IntoResponse};

#[derive(Debug, thiserror::Error)]
pub enum SignupError {
    #[error(transparent)]
    Session(#[from] tower_sessions::session::Error),

    #[error(transparent)]
    Render(#[from] rinja::Error),

    #[error("500 Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for SignupError {
    fn into_response(self) -> axum::response::Response {
        tracing::error!("Internal server error: {self}");

        (StatusCode::INTERNAL_SERVER_ERROR, "500 Internal Server Error").into_response()
    }
}
