use std::time::{Duration, SystemTime};

use diesel::{Insertable, Queryable};

use crate::schema::notes;

/// A stored note. Immutable once created; it only ever leaves the store by
/// being consumed or by expiring.
#[derive(Clone, Debug, PartialEq, Eq, Queryable, Insertable)]
#[diesel(table_name = notes)]
pub struct Note {
    pub id: String,
    pub payload: Vec<u8>,
    pub self_destruct: bool,
    pub created_at: SystemTime,
    pub expires_at: SystemTime,
}

impl Note {
    /// Builds a note living for `ttl` from now. `None` when the expiry
    /// cannot be represented as a timestamp.
    pub fn new(id: String, payload: Vec<u8>, self_destruct: bool, ttl: Duration) -> Option<Note> {
        let created_at = SystemTime::now();
        let expires_at = created_at.checked_add(ttl)?;

        Some(Note {
            id,
            payload,
            self_destruct,
            created_at,
            expires_at,
        })
    }

    pub fn is_expired_at(&self, now: SystemTime) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(SystemTime::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_exactly_at_deadline() {
        let note = Note::new("a".into(), b"x".to_vec(), true, Duration::from_secs(60)).unwrap();
        assert!(!note.is_expired_at(note.created_at));
        assert!(!note.is_expired_at(note.expires_at - Duration::from_millis(1)));
        assert!(note.is_expired_at(note.expires_at));
        assert!(note.is_expired_at(note.expires_at + Duration::from_secs(1)));
    }

    #[test]
    fn unrepresentable_lifetime_is_rejected() {
        assert!(Note::new("a".into(), vec![], false, Duration::MAX).is_none());
    }
}
