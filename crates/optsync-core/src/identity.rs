//! Composite natural keys and per-run dedup caches.
//!
//! Adoptions and enrollments have no opaque id we can rely on, so identity is
//! `term|dept|course|section|discriminator`. Components are joined verbatim:
//! empty components are valid and distinguish keys.

use std::collections::HashSet;
use std::marker::PhantomData;

/// Separator between key components.
pub const KEY_SEPARATOR: &str = "|";

/// Join five identity components into a composite key.
pub fn key(term: &str, dept: &str, course: &str, section: &str, discriminator: &str) -> String {
    [term, dept, course, section, discriminator].join(KEY_SEPARATOR)
}

/// Adoption identity, discriminated by item scan code (ISBN).
pub fn adoption_key(term: &str, dept: &str, course: &str, section: &str, item_scan_code: &str) -> String {
    key(term, dept, course, section, item_scan_code)
}

/// Enrollment identity, discriminated by student/customer id.
pub fn enrollment_key(term: &str, dept: &str, course: &str, section: &str, customer: &str) -> String {
    key(term, dept, course, section, customer)
}

/// Marker for the adoption identity space.
#[derive(Debug)]
pub enum AdoptionKeys {}

/// Marker for the enrollment identity space.
#[derive(Debug)]
pub enum EnrollmentKeys {}

/// Keys confirmed to exist remotely during the current run.
///
/// Membership only grows. The marker parameter keeps the adoption and
/// enrollment caches from being mixed up.
#[derive(Debug)]
pub struct DedupCache<K> {
    confirmed: HashSet<String>,
    _space: PhantomData<K>,
}

/// Cache of adoption keys confirmed remotely.
pub type AdoptionCache = DedupCache<AdoptionKeys>;

/// Cache of enrollment keys confirmed remotely.
pub type EnrollmentCache = DedupCache<EnrollmentKeys>;

impl<K> DedupCache<K> {
    pub fn new() -> Self {
        Self {
            confirmed: HashSet::new(),
            _space: PhantomData,
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.confirmed.contains(key)
    }

    /// Record a key. Adding a key twice is a no-op.
    pub fn add(&mut self, key: impl Into<String>) {
        self.confirmed.insert(key.into());
    }

    /// Number of unique keys.
    pub fn size(&self) -> usize {
        self.confirmed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.confirmed.is_empty()
    }
}

impl<K> Default for DedupCache<K> {
    fn default() -> Self {
        Self::new()
    }
}
