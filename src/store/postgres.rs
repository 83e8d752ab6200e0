use std::time::{Duration, SystemTime};

use diesel::{
    pg::PgConnection,
    prelude::*,
    r2d2::{ConnectionManager, CustomizeConnection},
    result::{DatabaseErrorKind, Error as DieselError},
};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use super::NoteStore;
use crate::{
    errors::{NoteError, StoreError},
    models::note::Note,
    schema::notes::dsl::{expires_at, id, notes},
};

pub type Pool = r2d2::Pool<ConnectionManager<PgConnection>>;
type Connection = r2d2::PooledConnection<ConnectionManager<PgConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Applies `statement_timeout` to every connection handed out by the pool so
/// no query can outlive the store timeout server side either.
#[derive(Debug)]
struct StatementTimeout(Duration);

impl CustomizeConnection<PgConnection, diesel::r2d2::Error> for StatementTimeout {
    fn on_acquire(&self, conn: &mut PgConnection) -> Result<(), diesel::r2d2::Error> {
        diesel::sql_query(format!("SET statement_timeout = {}", self.0.as_millis()))
            .execute(conn)
            .map(|_| ())
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// PostgreSQL note store. Consumption is a single `DELETE ... RETURNING`,
/// so atomicity holds across every process sharing the database.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool,
    timeout: Duration,
}

impl PgStore {
    /// Builds the pool and runs pending migrations.
    pub fn connect(database_url: &str, timeout: Duration) -> Result<PgStore, StoreError> {
        let manager = ConnectionManager::<PgConnection>::new(database_url);
        let pool = r2d2::Pool::builder()
            .connection_timeout(timeout)
            .connection_customizer(Box::new(StatementTimeout(timeout)))
            .build(manager)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let store = PgStore { pool, timeout };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        let mut connection = self.connection()?;
        let applied = connection
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        for migration in applied {
            log::info!("applied migration {migration}");
        }
        Ok(())
    }

    fn connection(&self) -> Result<Connection, StoreError> {
        // r2d2 only fails a checkout once connection_timeout has elapsed
        self.pool.get().map_err(|e| {
            log::warn!("note store pool checkout failed: {e}");
            StoreError::Timeout(self.timeout)
        })
    }
}

impl NoteStore for PgStore {
    fn put(&self, note: Note) -> Result<(), NoteError> {
        let mut connection = self.connection()?;

        let insert = diesel::insert_into(notes).values(&note);
        match insert.execute(&mut connection) {
            Ok(_) => Ok(()),
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                Err(NoteError::Conflict(note.id))
            }
            Err(e) => Err(StoreError::from(e).into()),
        }
    }

    fn get(&self, note_id: &str) -> Result<Note, NoteError> {
        let mut connection = self.connection()?;

        notes
            .filter(id.eq(note_id))
            .filter(expires_at.gt(SystemTime::now()))
            .first::<Note>(&mut connection)
            .optional()
            .map_err(StoreError::from)?
            .ok_or(NoteError::NotFound)
    }

    fn fetch_and_consume(&self, note_id: &str) -> Result<Note, NoteError> {
        let mut connection = self.connection()?;

        let live = notes
            .filter(id.eq(note_id))
            .filter(expires_at.gt(SystemTime::now()));
        diesel::delete(live)
            .get_result::<Note>(&mut connection)
            .optional()
            .map_err(StoreError::from)?
            .ok_or(NoteError::NotFound)
    }

    fn purge_expired(&self) -> Result<usize, StoreError> {
        let mut connection = self.connection()?;

        let expired = notes.filter(expires_at.le(SystemTime::now()));
        let purged = diesel::delete(expired).execute(&mut connection)?;
        Ok(purged)
    }
}
