use std::time::Duration;

use actix_web::{http::StatusCode, HttpResponse};
use derive_more::Display;

/// Failures of the storage backend itself. Never retried inside the crate.
#[derive(Debug, Display)]
pub enum StoreError {
    #[display(fmt = "store unavailable: {}", _0)]
    Unavailable(String),
    #[display(fmt = "store operation timed out after {:?}", _0)]
    Timeout(Duration),
    #[display(fmt = "store returned a malformed result: {}", _0)]
    Malformed(String),
}

impl std::error::Error for StoreError {}

impl From<diesel::result::Error> for StoreError {
    fn from(err: diesel::result::Error) -> StoreError {
        use diesel::result::Error;

        match err {
            Error::DeserializationError(e) => StoreError::Malformed(e.to_string()),
            e => StoreError::Unavailable(e.to_string()),
        }
    }
}

#[derive(Debug, Display)]
pub enum NoteError {
    // expired, consumed and never-existed are deliberately the same outcome
    #[display(fmt = "note not found")]
    NotFound,
    #[display(fmt = "note id '{}' is already taken", _0)]
    Conflict(String),
    #[display(fmt = "note lifetime cannot be represented")]
    InvalidLifetime,
    #[display(fmt = "{}", _0)]
    Store(StoreError),
}

impl NoteError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, NoteError::NotFound)
    }
}

impl std::error::Error for NoteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NoteError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for NoteError {
    fn from(err: StoreError) -> NoteError {
        NoteError::Store(err)
    }
}

/// Errors surfaced by the HTTP handlers. Handlers render a missing note
/// themselves, so every `Note` error that lands here is a server error.
#[derive(Debug, Display)]
pub enum ServerError {
    UnsupportedMediaType,
    #[display(fmt = "{}", _0)]
    BadRequest(&'static str),
    #[display(fmt = "template error: {}", _0)]
    Template(minijinja::Error),
    #[display(fmt = "blocking task failed")]
    Blocking,
    #[display(fmt = "{}", _0)]
    Note(NoteError),
}

impl From<NoteError> for ServerError {
    fn from(err: NoteError) -> ServerError {
        ServerError::Note(err)
    }
}

impl From<minijinja::Error> for ServerError {
    fn from(err: minijinja::Error) -> ServerError {
        ServerError::Template(err)
    }
}

impl From<actix_web::error::BlockingError> for ServerError {
    fn from(_: actix_web::error::BlockingError) -> ServerError {
        ServerError::Blocking
    }
}

impl actix_web::error::ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServerError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ServerError::UnsupportedMediaType => {
                HttpResponse::UnsupportedMediaType().body("Invalid media type posted.")
            }
            ServerError::BadRequest(msg) => HttpResponse::BadRequest().body(*msg),
            e => {
                log::error!("{e}");
                HttpResponse::InternalServerError()
                    .body("Ops something went wrong. Please check the server logs.")
            }
        }
    }
}
