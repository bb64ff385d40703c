//! Layout warnings with colored terminal output.
//!
//! Provides deduplication so a bad string that is rebuilt on every property
//! change only reports its problem once. Used by the markup and layout crates
//! when lenient validation skips an element instead of failing the rebuild.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use owo_colors::OwoColorize;

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about degraded content (prints once per unique message).
///
/// # Example
/// ```ignore
/// warn_once("Layout", "no embedded node registered for id 'missing'");
/// ```
pub fn warn_once(component: &str, message: &str) {
    let key = format!("[{component}] {message}");
    let should_print = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if should_print {
        eprintln!("{}", format!("[RichText {component}] ⚠ {message}").yellow());
    }
}

/// Clear all recorded warnings (call when a host swaps its whole string table).
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}
