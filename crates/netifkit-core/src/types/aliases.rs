//! Type aliases for commonly used shared-state and callback types.
//!
//! Complex types like `Arc<Mutex<Vec<T>>>` or `Arc<dyn Fn(..) + Send + Sync>`
//! are hard to read at a glance; the aliases here give them intent-revealing
//! names and keep the same pattern used the same way across crates.

use crate::types::RawSource;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

// =============================================================================
// THREAD-SAFE SHARED TYPES
// =============================================================================

/// A thread-safe, mutex-protected wrapper for cross-thread sharing.
///
/// Uses `parking_lot::Mutex` for better performance than `std::sync::Mutex`.
pub type ThreadSafe<T> = Arc<Mutex<T>>;

/// A thread-safe reader-writer lock wrapper for read-heavy state.
pub type ThreadSafeRw<T> = Arc<RwLock<T>>;

// =============================================================================
// CALLBACK TYPES
// =============================================================================

/// The raw event sink a driver delivers into: `(source, sub-code, payload)`.
///
/// The payload slice is only valid for the duration of the call; receivers
/// must copy out anything they keep.
pub type RawEventSink = Arc<dyn Fn(RawSource, i32, &[u8]) + Send + Sync>;

// =============================================================================
// CONSTRUCTOR HELPERS
// =============================================================================

/// Create a new `ThreadSafe<T>` from a value.
#[inline]
pub fn thread_safe<T>(value: T) -> ThreadSafe<T> {
    Arc::new(Mutex::new(value))
}

/// Create a new `ThreadSafeRw<T>` from a value.
#[inline]
pub fn thread_safe_rw<T>(value: T) -> ThreadSafeRw<T> {
    Arc::new(RwLock::new(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_safe_creation() {
        let value: ThreadSafe<i32> = thread_safe(42);
        assert_eq!(*value.lock(), 42);

        *value.lock() = 100;
        assert_eq!(*value.lock(), 100);
    }

    #[test]
    fn test_thread_safe_rw() {
        let value: ThreadSafeRw<i32> = thread_safe_rw(7);
        assert_eq!(*value.read(), 7);

        *value.write() = 8;
        assert_eq!(*value.read(), 8);
    }

    #[test]
    fn test_raw_event_sink() {
        let seen: ThreadSafe<Vec<(RawSource, i32, Vec<u8>)>> = thread_safe(Vec::new());
        let seen_clone = seen.clone();
        let sink: RawEventSink = Arc::new(move |source, code, payload| {
            seen_clone.lock().push((source, code, payload.to_vec()));
        });

        sink(RawSource::Wifi, 5, &[1, 2, 3]);
        let log = seen.lock();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].1, 5);
        assert_eq!(log[0].2, vec![1, 2, 3]);
    }
}
