//! Keyed note storage with per-entry expiry.
//!
//! Two backends implement [`NoteStore`]:
//! - [`memory::MemoryStore`]: in-process, sharded, used when no database is
//!   configured and by the tests
//! - [`postgres::PgStore`]: diesel over an r2d2 pool
//!
//! Every call is bounded by the timeout the store was built with.

use crate::{
    errors::{NoteError, StoreError},
    models::note::Note,
};

pub mod memory;
pub mod postgres;

pub trait NoteStore: Send + Sync {
    /// Inserts a note under its id. An id that is already present, live or
    /// expired, is rejected with [`NoteError::Conflict`].
    fn put(&self, note: Note) -> Result<(), NoteError>;

    /// Returns a live note without touching it.
    fn get(&self, id: &str) -> Result<Note, NoteError>;

    /// Reads and deletes a live note as one indivisible step. Of any number
    /// of concurrent callers for the same id at most one gets the note, the
    /// rest get [`NoteError::NotFound`].
    fn fetch_and_consume(&self, id: &str) -> Result<Note, NoteError>;

    /// Physically removes expired entries, returning how many went away.
    fn purge_expired(&self) -> Result<usize, StoreError>;
}
