//! The key-registration seam.

use keycombo::KeyCombo;

use crate::Result;

/// Registers global key combinations with the operating system.
///
/// Implementations return an opaque registration id from
/// [`ShortcutBackend::register`]; the host keeps the id → action mapping.
pub trait ShortcutBackend: Send + Sync {
    /// Start intercepting `combo`. Fails when the combination is unavailable.
    fn register(&self, combo: &KeyCombo) -> Result<u32>;

    /// Stop intercepting a previously registered combination.
    fn unregister(&self, id: u32) -> Result<()>;
}
