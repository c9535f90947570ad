//! Fingerprint-keyed response cache with stable value handles.
//!
//! The input worker owns the map and is the only party that inserts; the
//! output worker fills each entry's value slot at most once, through a
//! handle it received over the queue. A slot is a `OnceLock`, which gives
//! the once-only empty→filled transition and the cross-thread visibility
//! the two workers rely on, with no further locking.

use anyhow::{anyhow, Result};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// Stable reference to one cache entry's value slot.
///
/// Clones are cheap and all refer to the same slot. A handle keeps its slot
/// alive independently of the [`Cache`] that minted it, and once filled the
/// slot's bytes never move or change.
#[derive(Clone)]
pub struct Handle(Arc<OnceLock<Box<[u8]>>>);

impl Handle {
    /// The cached response line, or `None` while the slot is still empty.
    pub fn value(&self) -> Option<&[u8]> {
        self.0.get().map(|bytes| bytes.as_ref())
    }

    /// Install the child's response line into the slot.
    ///
    /// Filling an already-filled slot is an error; the bytes installed
    /// first are left untouched.
    pub fn fill(&self, bytes: Vec<u8>) -> Result<()> {
        self.0
            .set(bytes.into_boxed_slice())
            .map_err(|_| anyhow!("cache slot filled twice"))
    }
}

/// Map from line fingerprint to response slot. Entries are never removed.
#[derive(Default)]
pub struct Cache {
    entries: HashMap<u64, Handle>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the handle for `fingerprint`, minting an empty slot on first
    /// sight. The boolean is true exactly when this call created the entry.
    pub fn lookup_or_insert(&mut self, fingerprint: u64) -> (Handle, bool) {
        match self.entries.entry(fingerprint) {
            Entry::Occupied(entry) => (entry.get().clone(), false),
            Entry::Vacant(entry) => {
                let handle = Handle(Arc::new(OnceLock::new()));
                entry.insert(handle.clone());
                (handle, true)
            }
        }
    }

    /// Number of distinct fingerprints seen so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
