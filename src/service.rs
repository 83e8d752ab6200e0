//! Note creation and one-time reads on top of a [`NoteStore`].

use std::{sync::Arc, time::Duration};

use crate::{errors::NoteError, id::IdGenerator, models::note::Note, store::NoteStore};

/// Outcome of a successful read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadNote {
    pub payload: Vec<u8>,
    /// True when this read destroyed the note.
    pub consumed: bool,
}

#[derive(Clone)]
pub struct NoteService {
    store: Arc<dyn NoteStore>,
    ids: Arc<dyn IdGenerator>,
    lifetime: Duration,
}

impl NoteService {
    /// `lifetime` is both the default and the upper bound for note ttls.
    pub fn new(
        store: Arc<dyn NoteStore>,
        ids: Arc<dyn IdGenerator>,
        lifetime: Duration,
    ) -> NoteService {
        NoteService {
            store,
            ids,
            lifetime,
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Stores a new note and returns its id.
    pub fn create_note(
        &self,
        payload: Vec<u8>,
        self_destruct: bool,
        ttl: Option<Duration>,
    ) -> Result<String, NoteError> {
        let ttl = match ttl {
            Some(ttl) if !ttl.is_zero() => ttl.min(self.lifetime),
            _ => self.lifetime,
        };

        let note = Note::new(self.ids.new_id(), payload, self_destruct, ttl)
            .ok_or(NoteError::InvalidLifetime)?;
        let note_id = note.id.clone();
        self.store.put(note)?;

        log::debug!(
            "created note {note_id} (self_destruct: {self_destruct}, ttl: {ttl:?})"
        );
        Ok(note_id)
    }

    /// Returns the note's payload, consuming it when it self-destructs.
    ///
    /// Expired, already consumed and unknown ids all yield
    /// [`NoteError::NotFound`].
    pub fn read_note(&self, note_id: &str) -> Result<ReadNote, NoteError> {
        let note = self.store.get(note_id)?;
        if !note.self_destruct {
            return Ok(ReadNote {
                payload: note.payload,
                consumed: false,
            });
        }

        // a racing reader may consume it between the two calls; then this
        // caller simply sees NotFound
        let note = self.store.fetch_and_consume(note_id)?;
        log::debug!("consumed note {note_id}");
        Ok(ReadNote {
            payload: note.payload,
            consumed: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{errors::StoreError, id::UuidGenerator, store::memory::MemoryStore};
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Barrier,
        },
        thread,
    };

    const YEAR: Duration = Duration::from_secs(60 * 60 * 24 * 365);

    fn service() -> (NoteService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new(Duration::from_secs(1)));
        let service = NoteService::new(store.clone(), Arc::new(UuidGenerator), YEAR);
        (service, store)
    }

    /// Always hands out the same id.
    struct FixedId;

    impl IdGenerator for FixedId {
        fn new_id(&self) -> String {
            "fixed".to_string()
        }
    }

    /// Fails every call the way an unreachable backend would.
    struct DownStore;

    impl NoteStore for DownStore {
        fn put(&self, _: Note) -> Result<(), NoteError> {
            Err(StoreError::Unavailable("connection refused".into()).into())
        }

        fn get(&self, _: &str) -> Result<Note, NoteError> {
            Err(StoreError::Unavailable("connection refused".into()).into())
        }

        fn fetch_and_consume(&self, _: &str) -> Result<Note, NoteError> {
            Err(StoreError::Unavailable("connection refused".into()).into())
        }

        fn purge_expired(&self) -> Result<usize, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
    }

    #[test]
    fn self_destructing_note_reads_once() {
        let (service, _) = service();
        let day = Duration::from_secs(24 * 60 * 60);
        let id = service
            .create_note(b"hello".to_vec(), true, Some(day))
            .unwrap();

        let read = service.read_note(&id).unwrap();
        assert_eq!(read.payload, b"hello");
        assert!(read.consumed);

        assert!(service.read_note(&id).unwrap_err().is_not_found());
    }

    #[test]
    fn payload_round_trips_byte_for_byte() {
        let (service, _) = service();
        let payload: Vec<u8> = (0..=255).collect();
        let id = service.create_note(payload.clone(), true, None).unwrap();
        assert_eq!(service.read_note(&id).unwrap().payload, payload);
    }

    #[test]
    fn persistent_note_reads_repeatedly() {
        let (service, _) = service();
        let id = service.create_note(b"keep".to_vec(), false, None).unwrap();

        for _ in 0..5 {
            let read = service.read_note(&id).unwrap();
            assert_eq!(read.payload, b"keep");
            assert!(!read.consumed);
        }
    }

    #[test]
    fn note_expires_after_ttl() {
        let (service, _) = service();
        let id = service
            .create_note(b"keep".to_vec(), false, Some(Duration::from_secs(1)))
            .unwrap();
        assert_eq!(service.read_note(&id).unwrap().payload, b"keep");

        thread::sleep(Duration::from_millis(1100));
        assert!(service.read_note(&id).unwrap_err().is_not_found());
    }

    #[test]
    fn unread_self_destructing_note_expires_too() {
        let (service, _) = service();
        let id = service
            .create_note(b"gone".to_vec(), true, Some(Duration::from_millis(50)))
            .unwrap();

        thread::sleep(Duration::from_millis(100));
        assert!(service.read_note(&id).unwrap_err().is_not_found());
    }

    #[test]
    fn ttl_is_clamped_to_lifetime() {
        let store = Arc::new(MemoryStore::new(Duration::from_secs(1)));
        let lifetime = Duration::from_secs(60);
        let service = NoteService::new(store.clone(), Arc::new(UuidGenerator), lifetime);

        for ttl in [None, Some(Duration::ZERO), Some(YEAR)] {
            let id = service.create_note(b"x".to_vec(), false, ttl).unwrap();
            let note = store.get(&id).unwrap();
            let kept = note.expires_at.duration_since(note.created_at).unwrap();
            assert_eq!(kept, lifetime);
        }
    }

    #[test]
    fn unknown_id_is_not_found() {
        let (service, _) = service();
        assert!(service.read_note("missing").unwrap_err().is_not_found());
    }

    #[test]
    fn duplicate_id_is_a_conflict() {
        let store = Arc::new(MemoryStore::new(Duration::from_secs(1)));
        let service = NoteService::new(store, Arc::new(FixedId), YEAR);

        service.create_note(b"one".to_vec(), false, None).unwrap();
        let err = service
            .create_note(b"two".to_vec(), false, None)
            .unwrap_err();
        assert!(matches!(err, NoteError::Conflict(id) if id == "fixed"));
        assert_eq!(service.read_note("fixed").unwrap().payload, b"one");
    }

    #[test]
    fn store_failures_propagate() {
        let service = NoteService::new(Arc::new(DownStore), Arc::new(UuidGenerator), YEAR);
        assert!(matches!(
            service.create_note(b"x".to_vec(), true, None),
            Err(NoteError::Store(_))
        ));
        let err = service.read_note("x").unwrap_err();
        assert!(matches!(err, NoteError::Store(_)));
    }

    #[test]
    fn concurrent_reads_deliver_at_most_once() {
        for readers in [1, 2, 8, 32] {
            let (service, store) = service();
            let id = service.create_note(b"once".to_vec(), true, None).unwrap();

            let barrier = Arc::new(Barrier::new(readers));
            let successes = Arc::new(AtomicUsize::new(0));
            let handles: Vec<_> = (0..readers)
                .map(|_| {
                    let service = service.clone();
                    let barrier = barrier.clone();
                    let successes = successes.clone();
                    let id = id.clone();
                    thread::spawn(move || {
                        barrier.wait();
                        match service.read_note(&id) {
                            Ok(read) => {
                                assert_eq!(read.payload, b"once");
                                successes.fetch_add(1, Ordering::SeqCst);
                            }
                            Err(e) => assert!(e.is_not_found()),
                        }
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }
            assert_eq!(successes.load(Ordering::SeqCst), 1);
            assert!(store.is_empty());
        }
    }
}
