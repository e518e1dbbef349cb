//! In-memory backend for tests and dry runs.

use std::collections::{BTreeMap, HashSet};

use keycombo::KeyCombo;
use parking_lot::Mutex;

use crate::{Error, Result, ShortcutBackend};

/// Mutable state behind [`MockBackend`].
#[derive(Debug, Default)]
struct MockState {
    /// Next registration id.
    next_id: u32,
    /// Live registrations.
    live: BTreeMap<u32, KeyCombo>,
    /// Combinations owned by "another application".
    occupied: HashSet<KeyCombo>,
    /// Total successful registrations.
    registrations: usize,
    /// When set, every unregister call fails.
    fail_unregister: bool,
}

/// Backend that records registrations without touching the OS.
#[derive(Debug, Default)]
pub struct MockBackend {
    /// Shared state.
    state: Mutex<MockState>,
}

impl MockBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend another application owns `combo`.
    pub fn occupy(&self, combo: KeyCombo) {
        self.state.lock().occupied.insert(combo);
    }

    /// Release a combination previously passed to [`MockBackend::occupy`].
    pub fn release(&self, combo: &KeyCombo) {
        self.state.lock().occupied.remove(combo);
    }

    /// Make unregister calls fail (or succeed again).
    pub fn set_fail_unregister(&self, fail: bool) {
        self.state.lock().fail_unregister = fail;
    }

    /// Currently registered combinations, in registration order.
    pub fn live(&self) -> Vec<KeyCombo> {
        self.state.lock().live.values().cloned().collect()
    }

    /// True when `combo` is currently registered.
    pub fn is_live(&self, combo: &KeyCombo) -> bool {
        self.state.lock().live.values().any(|c| c == combo)
    }

    /// Number of successful register calls so far.
    pub fn registrations(&self) -> usize {
        self.state.lock().registrations
    }
}

impl ShortcutBackend for MockBackend {
    fn register(&self, combo: &KeyCombo) -> Result<u32> {
        let mut st = self.state.lock();
        if st.occupied.contains(combo) {
            return Err(Error::Backend(format!(
                "{combo} is already bound by another application"
            )));
        }
        if st.live.values().any(|c| c == combo) {
            return Err(Error::Backend(format!("{combo} is already registered")));
        }
        st.next_id += 1;
        let id = st.next_id;
        st.live.insert(id, combo.clone());
        st.registrations += 1;
        Ok(id)
    }

    fn unregister(&self, id: u32) -> Result<()> {
        let mut st = self.state.lock();
        if st.fail_unregister {
            return Err(Error::Backend(format!("cannot unregister id {id}")));
        }
        st.live
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::Backend(format!("unknown registration id {id}")))
    }
}
