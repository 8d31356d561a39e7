use serde::Serialize;

use business::domain::errors::CaptureError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub name: String,
    pub message: String,
}

pub trait IntoErrorResponse {
    fn into_error_response(self) -> ErrorResponse;
}

impl IntoErrorResponse for CaptureError {
    fn into_error_response(self) -> ErrorResponse {
        ErrorResponse {
            name: self.name().to_string(),
            message: self.to_string(),
        }
    }
}
