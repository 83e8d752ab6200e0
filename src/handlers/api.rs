use std::fmt::Display;

use actix_web::{error::JsonPayloadError, http::header, web, HttpRequest, HttpResponse};
use serde_derive::Deserialize;
use serde_json::{json, Value};

use super::validate;
use crate::{
    errors::{NoteError, ServerError},
    AppState,
};

#[derive(Deserialize)]
pub struct NewNote {
    pub message: String,
    pub self_destruct: Option<bool>,
    pub lifetime_in_secs: Option<u64>,
}

fn error_body(message: impl Display) -> Value {
    json!({ "error": message.to_string() })
}

pub fn json_error(err: JsonPayloadError, _: &HttpRequest) -> actix_web::Error {
    let response = HttpResponse::BadRequest().json(error_body(&err));
    actix_web::error::InternalError::from_response(err, response).into()
}

pub async fn new(
    input: web::Json<NewNote>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ServerError> {
    let input = input.into_inner();
    let ttl = match validate(&input.message, input.lifetime_in_secs) {
        Ok(ttl) => ttl,
        Err(msg) => return Ok(HttpResponse::BadRequest().json(error_body(msg))),
    };
    let self_destruct = input.self_destruct.unwrap_or(true);

    let notes = state.notes.clone();
    let payload = input.message.into_bytes();
    let create = move || notes.create_note(payload, self_destruct, ttl);
    let note_id = web::block(create).await??;

    Ok(HttpResponse::Created().json(json!({
        "id": note_id,
        "url": format!("{}/{}", state.base_url, note_id),
        "self_destruct": self_destruct,
    })))
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
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .json(json!({
                "id": note_id,
                "message": String::from_utf8_lossy(&read.payload),
                "consumed": read.consumed,
            }))),
        Err(NoteError::NotFound) => {
            let body = error_body("note not found");
            Ok(HttpResponse::NotFound().json(body))
        }
        Err(e) => Err(e.into()),
    }
}
