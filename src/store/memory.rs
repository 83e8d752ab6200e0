use std::{
    collections::{hash_map::RandomState, HashMap},
    hash::BuildHasher,
    time::{Duration, SystemTime},
};

use parking_lot::{Mutex, MutexGuard};

use super::NoteStore;
use crate::{
    errors::{NoteError, StoreError},
    models::note::Note,
};

pub const DEFAULT_SHARDS: usize = 16;

type Shard = HashMap<String, Note>;

/// In-process note store.
///
/// Entries are spread over independently locked shards so unrelated notes
/// never wait on each other. Lock acquisition is bounded by `timeout`.
pub struct MemoryStore {
    shards: Vec<Mutex<Shard>>,
    hasher: RandomState,
    timeout: Duration,
}

impl MemoryStore {
    pub fn new(timeout: Duration) -> MemoryStore {
        MemoryStore::with_shards(DEFAULT_SHARDS, timeout)
    }

    pub fn with_shards(shards: usize, timeout: Duration) -> MemoryStore {
        MemoryStore {
            shards: (0..shards.max(1))
                .map(|_| Mutex::new(HashMap::new()))
                .collect(),
            hasher: RandomState::new(),
            timeout,
        }
    }

    /// Number of entries held, expired ones included. Waits for every shard.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.lock().len()).sum()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self, id: &str) -> Result<MutexGuard<'_, Shard>, StoreError> {
        let idx = (self.hasher.hash_one(id) % self.shards.len() as u64) as usize;
        self.lock_shard(&self.shards[idx])
    }

    fn lock_shard<'a>(
        &self,
        shard: &'a Mutex<Shard>,
    ) -> Result<MutexGuard<'a, Shard>, StoreError> {
        shard
            .try_lock_for(self.timeout)
            .ok_or(StoreError::Timeout(self.timeout))
    }
}

impl NoteStore for MemoryStore {
    fn put(&self, note: Note) -> Result<(), NoteError> {
        let mut shard = self.lock(&note.id)?;
        if shard.contains_key(&note.id) {
            return Err(NoteError::Conflict(note.id));
        }
        shard.insert(note.id.clone(), note);
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Note, NoteError> {
        let mut shard = self.lock(id)?;
        match shard.get(id) {
            Some(note) if note.is_expired() => {
                shard.remove(id);
                Err(NoteError::NotFound)
            }
            Some(note) => Ok(note.clone()),
            None => Err(NoteError::NotFound),
        }
    }

    fn fetch_and_consume(&self, id: &str) -> Result<Note, NoteError> {
        // remove under the shard lock; whoever removes it owns it
        let mut shard = self.lock(id)?;
        match shard.remove(id) {
            Some(note) if !note.is_expired() => Ok(note),
            _ => Err(NoteError::NotFound),
        }
    }

    fn purge_expired(&self) -> Result<usize, StoreError> {
        let now = SystemTime::now();
        let mut purged = 0;
        for shard in &self.shards {
            let mut shard = self.lock_shard(shard)?;
            let before = shard.len();
            shard.retain(|_, note| !note.is_expired_at(now));
            purged += before - shard.len();
        }
        Ok(purged)
    }
}
