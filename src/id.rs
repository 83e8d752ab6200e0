//! Note identifiers.
//!
//! Ids are the only capability a reader needs, so they have to be random
//! enough that nobody can walk the namespace. Both generators below draw
//! more than 120 bits from the OS-seeded thread rng.

use nanoid::nanoid;
use uuid::Uuid;

pub trait IdGenerator: Send + Sync {
    fn new_id(&self) -> String;
}

/// Hyphenated lowercase version-4 uuids, 122 random bits.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn new_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// 21 characters over the url-safe nanoid alphabet, 126 random bits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NanoIdGenerator;

impl IdGenerator for NanoIdGenerator {
    fn new_id(&self) -> String {
        nanoid!(21)
    }
}
