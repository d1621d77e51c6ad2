use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::models::ErrorResponse;
use crate::store::StoreError;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    /// The request itself is unusable; reported back verbatim.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl QuizError {
    pub fn validation(message: impl Into<String>) -> Self {
        QuizError::Validation(message.into())
    }
}

impl ResponseError for QuizError {
    fn status_code(&self) -> StatusCode {
        match self {
            QuizError::Validation(_) => StatusCode::BAD_REQUEST,
            QuizError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            QuizError::Validation(message) => message.clone(),
            QuizError::Store(e) => {
                log::error!("Store error: {}", e);
                INTERNAL_ERROR_MESSAGE.to_string()
            }
        };
        HttpResponse::build(self.status_code()).json(ErrorResponse { message })
    }
}
