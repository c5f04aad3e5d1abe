//! REST API module.
//!
//! One file per resource under `/api`. Every handler answers with the
//! success envelope below or an [`AppError`](crate::errors::AppError).

mod auth;
mod bell_schedules;
mod calendar;
mod courses;
mod schools;
mod users;

pub use auth::*;
pub use bell_schedules::*;
pub use calendar::*;
pub use courses::*;
pub use schools::*;
pub use users::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            status: StatusCode::OK,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, crate::errors::AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}

/// Create a `201 Created` API response.
pub fn created<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse {
        status: StatusCode::CREATED,
        ..ApiResponse::new(data)
    })
}

/// Acknowledgement body for deletes.
#[derive(Debug, Serialize)]
pub struct Removed {
    pub message: String,
}

pub fn removed(what: &str) -> ApiResult<Removed> {
    success(Removed {
        message: format!("{} removed", what),
    })
}
