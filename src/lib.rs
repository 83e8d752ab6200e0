pub mod config;
pub mod errors;
pub mod handlers;
pub mod id;
pub mod models;
pub mod render;
pub mod schema;
pub mod service;
pub mod store;
pub mod sweeper;

use render::Pages;
use service::NoteService;

/// Shared by every request handler.
pub struct AppState {
    pub notes: NoteService,
    pub pages: Pages,
    /// Externally visible base url, no trailing slash.
    pub base_url: String,
}
