use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::{error, warn};
use uuid::Uuid;

use marchelo_core::errors::{ApplicationError, InterfaceError};

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

pub type ApiFailure = (StatusCode, Json<ApiError>);

pub fn correlation_id() -> String {
    Uuid::new_v4().simple().to_string()
}

pub fn bad_request(message: impl Into<String>) -> ApiFailure {
    (StatusCode::BAD_REQUEST, Json(ApiError { error: message.into() }))
}

pub const INVALID_BODY: &str = "Invalid request body";

/// JSON body extractor whose rejections use the `{ "error": ... }` shape.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiFailure;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(request, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                warn!(
                    event_name = "api.request.invalid_body",
                    correlation_id = %correlation_id(),
                    status = %rejection.status(),
                    error = %rejection.body_text(),
                    "request body rejected"
                );
                Err(bad_request(INVALID_BODY))
            }
        }
    }
}

/// Maps an application failure to a status code and a `{ "error": ... }` body.
/// Input and lookup failures echo their message; storage and configuration
/// failures only expose the generic user message.
pub fn reject(error: ApplicationError, correlation_id: &str) -> ApiFailure {
    let interface = error.into_interface(correlation_id);

    let (status, body) = match &interface {
        InterfaceError::BadRequest { message, .. } => (StatusCode::BAD_REQUEST, message.clone()),
        InterfaceError::NotFound { message, .. } => (StatusCode::NOT_FOUND, message.clone()),
        InterfaceError::ServiceUnavailable { .. } => {
            (StatusCode::SERVICE_UNAVAILABLE, interface.user_message().to_string())
        }
        InterfaceError::Internal { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, interface.user_message().to_string())
        }
    };

    if status.is_server_error() {
        error!(
            event_name = "api.request.failed",
            correlation_id = %interface.correlation_id(),
            error = %interface.message(),
            "request failed"
        );
    } else {
        warn!(
            event_name = "api.request.rejected",
            correlation_id = %interface.correlation_id(),
            error = %interface.message(),
            "request rejected"
        );
    }

    (status, Json(ApiError { error: body }))
}
