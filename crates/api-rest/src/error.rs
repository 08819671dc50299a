use api_shared::{session_from_authorization, AuthError, ErrorRes};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use storeit_core::{DocumentStoreError, FilesError, IdentityError, SessionToken, StoreError};

/// Errors returned by REST handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(e) => store_status(e),
        }
    }
}

fn store_status(e: &StoreError) -> StatusCode {
    match e {
        StoreError::Unauthenticated => StatusCode::UNAUTHORIZED,
        StoreError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,

        StoreError::Document(DocumentStoreError::InvalidQuery(_))
        | StoreError::Document(DocumentStoreError::InvalidDocument(_)) => StatusCode::BAD_REQUEST,
        StoreError::Document(DocumentStoreError::DocumentNotFound(_)) => StatusCode::NOT_FOUND,
        StoreError::Document(DocumentStoreError::Unavailable(_))
        | StoreError::Identity(IdentityError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,

        StoreError::Blob(FilesError::FileNotFound(_)) => StatusCode::NOT_FOUND,
        StoreError::Blob(FilesError::InvalidFileName(_)) => StatusCode::BAD_REQUEST,

        StoreError::UnknownFileType { .. }
        | StoreError::MalformedDocument { .. }
        | StoreError::Document(_)
        | StoreError::Blob(_)
        | StoreError::Identity(_)
        | StoreError::UploadRollbackFailed { .. }
        | StoreError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Internal details stay in the logs.
        let error = if status.is_server_error() {
            "Internal error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(ErrorRes { error })).into_response()
    }
}

/// Session taken from the `Authorization: Bearer` header.
pub struct Session(pub SessionToken);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        let session = session_from_authorization(header).inspect_err(|e| {
            tracing::debug!(error = %e, "rejected request without a usable session");
        })?;
        Ok(Session(session))
    }
}
