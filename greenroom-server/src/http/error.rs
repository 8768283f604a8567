use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use greenroom_core::{Error, ErrorBody, ErrorCode, ErrorDetail};

/// Wire form of `greenroom_core::Error`: a status code plus a
/// `{error: {code, message}}` body the client can map back.
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.code() {
            ErrorCode::Validation => StatusCode::BAD_REQUEST,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::InvalidState => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::PermissionDenied => StatusCode::FORBIDDEN,
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.0.code(),
                message: self.0.message().to_owned(),
            },
        };
        (status, Json(body)).into_response()
    }
}
