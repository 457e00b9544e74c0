//! Lazy cell with no locking at all.
//!
//! [`UnsyncCell`] is the naive lazy initializer: "if nothing is stored yet,
//! build a value and store it".  Nothing stops two callers that both find
//! the cell empty from each building a value; the later store overwrites the
//! earlier one, and the two callers walk away with different instances.
//! Once a store has happened, every later caller sees the stored value.
//!
//! The pointer is still an atomic with `Acquire`/`Release` ordering, so a
//! reader never observes a half-built value.  The race is in the check-then-
//! store sequence, not in memory.

use std::fmt;
use std::marker::PhantomData;
use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};

use tracing::trace;

/// A cell that keeps whichever value was stored last by a racing first
/// caller, and that value only.
///
/// Stored values are leaked and live until the process exits, matching the
/// lifetime of a singleton.  Values overwritten by a racing caller are leaked
/// as well, since the caller that built one may still hold it.
///
/// # Example
/// ```
/// use dp_core::patterns::unsync_cell::UnsyncCell;
///
/// static CELL: UnsyncCell<u32> = UnsyncCell::new();
///
/// assert_eq!(CELL.get_or_init(|| 1), &1);
/// assert_eq!(CELL.get_or_init(|| 2), &1);
/// ```
pub struct UnsyncCell<T: 'static> {
    ptr: AtomicPtr<T>,
    _owns: PhantomData<&'static T>,
}

// SAFETY: every thread may read the shared `&'static T` (needs `T: Sync`),
// and the value built on one thread is read on others (needs `T: Send`).
unsafe impl<T: Send + Sync + 'static> Sync for UnsyncCell<T> {}

impl<T: 'static> UnsyncCell<T> {
    /// Create an empty cell.
    pub const fn new() -> Self {
        Self {
            ptr: AtomicPtr::new(ptr::null_mut()),
            _owns: PhantomData,
        }
    }

    /// Return the stored value, or `None` if the cell is still empty.
    pub fn get(&self) -> Option<&'static T> {
        let current = self.ptr.load(Ordering::Acquire);
        // SAFETY: non-null pointers come from `Box::leak` in `get_or_init`,
        // are published with `Release`, and are never freed.
        unsafe { current.as_ref() }
    }

    /// Return the stored value, constructing it with `init` if the cell is
    /// empty.
    ///
    /// There is no lock: concurrent first callers may each run `init`, and
    /// each returns the value it built while the cell keeps the last one
    /// stored.
    pub fn get_or_init<F>(&self, init: F) -> &'static T
    where
        F: FnOnce() -> T,
    {
        if let Some(value) = self.get() {
            return value;
        }
        let fresh: &'static T = Box::leak(Box::new(init()));
        let previous = self
            .ptr
            .swap(fresh as *const T as *mut T, Ordering::Release);
        if !previous.is_null() {
            trace!("unsync cell: overwrote a value stored by a racing caller");
        }
        fresh
    }
}

impl<T: 'static> Default for UnsyncCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for UnsyncCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(value) => f.debug_tuple("UnsyncCell").field(value).finish(),
            None => f.write_str("UnsyncCell(<uninit>)"),
        }
    }
}
