use axum::{
    http::StatusCode,
    response::{IntoResponse, Response}
};
use anyhow;

use banka::LedgerError;

#[derive(Debug)]
pub(crate) enum ServerError {
    Rejected(String),
    Unavailable(String),
    InternalError(anyhow::Error)
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self {
            Self::Rejected(msg) =>
                (StatusCode::UNPROCESSABLE_ENTITY, format!("Request rejected: {}", msg)).into_response(),
            Self::Unavailable(msg) =>
                (StatusCode::SERVICE_UNAVAILABLE, format!("Unavailable: {}", msg)).into_response(),
            Self::InternalError(err) => {
                log::error!("internal error: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Internal error: {}", err)).into_response()
            }
        }
    }
}

impl From<LedgerError> for ServerError {
    fn from(err: LedgerError) -> Self {
        Self::Rejected(err.to_string())
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err)
    }
}
