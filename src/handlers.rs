use std::time::Duration;

use actix_web::{http::header::ContentType, web, HttpResponse};

use crate::{errors::ServerError, AppState};

pub mod api;
pub mod note;

/// Shortest lifetime a client may ask for.
pub const MIN_LIFETIME_SECS: u64 = 30;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::FormConfig::default().error_handler(note::form_error))
        .app_data(web::JsonConfig::default().error_handler(api::json_error))
        .service(
            web::scope("/api")
                .route("/notes", web::post().to(api::new))
                .route("/notes/{id}", web::get().to(api::get)),
        )
        .service(
            web::resource("/")
                .route(web::get().to(index))
                .route(web::post().to(note::new)),
        )
        .route("/{id}", web::get().to(note::get));
}

pub async fn index(state: web::Data<AppState>) -> Result<HttpResponse, ServerError> {
    let page = state.pages.index(state.notes.lifetime())?;
    Ok(HttpResponse::Ok().content_type(ContentType::html()).body(page))
}

/// Checks a submission and turns the requested lifetime into a ttl. The error
/// is the message shown to the client.
fn validate(
    message: &str,
    lifetime_in_secs: Option<u64>,
) -> Result<Option<Duration>, &'static str> {
    if message.trim().is_empty() {
        return Err("message is empty");
    }

    match lifetime_in_secs {
        Some(secs) if secs < MIN_LIFETIME_SECS => Err("lifetime is too short"),
        Some(secs) => Ok(Some(Duration::from_secs(secs))),
        None => Ok(None),
    }
}
