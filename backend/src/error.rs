use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::cache::ModelKind;
use crate::catalog::CatalogError;
use crate::models::ErrorBody;
use crate::preprocess::PreprocessError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing multipart field {0:?}")]
    MissingField(&'static str),

    #[error("invalid multipart request: {0}")]
    InvalidMultipart(String),

    #[error("invalid image: {0}")]
    InvalidImage(#[from] PreprocessError),

    #[error("{0} model is unavailable")]
    ModelUnavailable(ModelKind),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn inference(e: impl std::fmt::Display) -> Self {
        ApiError::Inference(e.to_string())
    }
}

impl From<actix_web::error::BlockingError> for ApiError {
    fn from(e: actix_web::error::BlockingError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingField(_) | ApiError::InvalidMultipart(_) | ApiError::InvalidImage(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Inference(_) | ApiError::Catalog(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody::new(self.to_string()))
    }
}
