//! Identifier generation for atoms created without an explicit id.

use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use chrono::Utc;
use uuid::Uuid;

/// Source of unique atom identifiers.
///
/// Only probabilistic uniqueness within a process is expected; atoms never
/// check ids against each other.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Digits-only, creation-time sortable ids: `YYYYMMDDHHMMSS` + microseconds
/// + 8 random digits (28 characters).
#[derive(Debug, Default, Clone, Copy)]
pub struct HumanIdGenerator;

impl IdGenerator for HumanIdGenerator {
    fn generate(&self) -> String {
        let stamp = Utc::now().format("%Y%m%d%H%M%S%6f");
        let noise = Uuid::new_v4().as_u128() % 100_000_000;
        format!("{stamp}{noise:08}")
    }
}

/// Hyphenated UUID v4 ids.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

impl<F> IdGenerator for F
where
    F: Fn() -> String + Send + Sync,
{
    fn generate(&self) -> String {
        self()
    }
}

/// Shared handle to a generator.
#[derive(Clone)]
pub struct SharedGenerator(Arc<dyn IdGenerator>);

impl SharedGenerator {
    pub fn new(generator: impl IdGenerator + 'static) -> Self {
        Self(Arc::new(generator))
    }

    pub fn generate(&self) -> String {
        self.0.generate()
    }
}

impl fmt::Debug for SharedGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedGenerator(..)")
    }
}

fn ambient() -> &'static RwLock<SharedGenerator> {
    static DEFAULT: OnceLock<RwLock<SharedGenerator>> = OnceLock::new();
    DEFAULT.get_or_init(|| RwLock::new(SharedGenerator::new(HumanIdGenerator)))
}

/// Generator used by [`crate::Atom::new`] and builders without their own.
pub fn default_generator() -> SharedGenerator {
    ambient()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Replace the process-wide generator.
pub fn set_default_generator(generator: SharedGenerator) {
    *ambient().write().unwrap_or_else(PoisonError::into_inner) = generator;
}

/// Generate an id with the process-wide generator.
pub fn generate_id() -> String {
    default_generator().generate()
}
