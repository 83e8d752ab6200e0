use actix_web::{
    error::UrlencodedError,
    http::header::{self, ContentType},
    web, HttpRequest, HttpResponse,
};
use serde_derive::Deserialize;

use super::validate;
use crate::{
    errors::{NoteError, ServerError},
    AppState,
};

#[derive(Deserialize)]
pub struct NewNoteForm {
    pub message: String,
    pub self_destruct: Option<bool>,
    pub lifetime_in_secs: Option<u64>,
}

pub fn form_error(err: UrlencodedError, _: &HttpRequest) -> actix_web::Error {
    match err {
        UrlencodedError::ContentType => ServerError::UnsupportedMediaType.into(),
        _ => ServerError::BadRequest("Invalid form data posted.").into(),
    }
}

pub async fn new(
    input: web::Form<NewNoteForm>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ServerError> {
    let input = input.into_inner();
    let ttl = match validate(&input.message, input.lifetime_in_secs) {
        Ok(ttl) => ttl,
        Err(msg) => return Err(ServerError::BadRequest(msg)),
    };
    let self_destruct = input.self_destruct.unwrap_or(true);

    let notes = state.notes.clone();
    let payload = input.message.into_bytes();
    let create = move || notes.create_note(payload, self_destruct, ttl);
    let note_id = web::block(create).await??;

    let note_url = format!("{}/{}", state.base_url, note_id);
    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(state.pages.success(&note_url, self_destruct)?))
}

pub async fn get(
    note_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ServerError> {
    let note_id = note_id.into_inner();
    let notes = state.notes.clone();
    let lookup = note_id.clone();

    match web::block(move || notes.read_note(&lookup)).await? {
        Ok(read) => Ok(HttpResponse::Ok()
            .content_type(ContentType::html())
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .body(state.pages.note(&read.payload, read.consumed)?)),
        Err(NoteError::NotFound) => Ok(HttpResponse::NotFound()
            .content_type(ContentType::html())
            .body(state.pages.not_found(&note_id)?)),
        Err(e) => Err(e.into()),
    }
}
