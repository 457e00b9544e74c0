//! Write-once cell built on double-checked locking.
//!
//! [`DoubleCheckedCell`] stores at most one value for its whole lifetime.
//! Readers take an unsynchronized fast path; only callers that find the cell
//! empty contend for the lock.
//!
//! | Step | Operation | Ordering |
//! |------|-----------|----------|
//! | fast path | load the pointer, return it if non-null | `Acquire` |
//! | slow path | lock, load again, construct if still null | `Acquire` |
//! | publish | store the boxed value before unlocking | `Release` |
//!
//! The `Release` store pairs with every `Acquire` load that observes it, so
//! a reader that sees a non-null pointer also sees the fully constructed
//! value behind it.

use std::fmt;
use std::marker::PhantomData;
use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};
use std::sync::{Mutex, PoisonError};

use tracing::trace;

/// A thread-safe cell that is initialized at most once.
///
/// Usable in a `static` because [`new`][Self::new] is `const`.
///
/// # Example
/// ```
/// use dp_core::patterns::double_checked::DoubleCheckedCell;
///
/// static GREETING: DoubleCheckedCell<String> = DoubleCheckedCell::new();
///
/// assert!(GREETING.get().is_none());
/// assert_eq!(GREETING.get_or_init(|| "hello".to_owned()), "hello");
/// assert_eq!(GREETING.get_or_init(|| "ignored".to_owned()), "hello");
/// ```
pub struct DoubleCheckedCell<T> {
    /// Null until the value is published; afterwards never changes.
    ptr: AtomicPtr<T>,
    /// Serializes initializers.  Guards no data of its own.
    lock: Mutex<()>,
    _owns: PhantomData<Box<T>>,
}

// SAFETY: shared access hands out `&T` to any thread (needs `T: Sync`) and
// the thread that wins initialization moves a `T` into the cell that another
// thread may later drop (needs `T: Send`).
unsafe impl<T: Send + Sync> Sync for DoubleCheckedCell<T> {}

impl<T> DoubleCheckedCell<T> {
    /// Create an empty cell.
    pub const fn new() -> Self {
        Self {
            ptr: AtomicPtr::new(ptr::null_mut()),
            lock: Mutex::new(()),
            _owns: PhantomData,
        }
    }

    /// Return the stored value, or `None` if the cell is still empty.
    ///
    /// Never blocks.
    pub fn get(&self) -> Option<&T> {
        let current = self.ptr.load(Ordering::Acquire);
        // SAFETY: a non-null pointer was produced by `Box::into_raw` in
        // `initialize` and published with `Release`; the `Acquire` load above
        // makes the pointee visible.  The allocation is only freed in `drop`,
        // which cannot run while `&self` is borrowed.
        unsafe { current.as_ref() }
    }

    /// Return the stored value, constructing it with `init` if the cell is
    /// empty.
    ///
    /// When several threads race on an empty cell exactly one of them runs
    /// its `init`; the others block briefly and then return that value.
    ///
    /// If `init` panics the cell stays empty and the next caller tries again.
    pub fn get_or_init<F>(&self, init: F) -> &T
    where
        F: FnOnce() -> T,
    {
        if let Some(value) = self.get() {
            return value;
        }
        self.initialize(init)
    }

    /// Return `true` once a value has been published.
    pub fn is_initialized(&self) -> bool {
        !self.ptr.load(Ordering::Acquire).is_null()
    }

    #[cold]
    fn initialize<F>(&self, init: F) -> &T
    where
        F: FnOnce() -> T,
    {
        // A poisoned lock only means an earlier initializer panicked; the
        // pointer is still null in that case.
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let current = self.ptr.load(Ordering::Acquire);
        if !current.is_null() {
            trace!("double-checked cell: initialized by another thread while waiting");
            // SAFETY: see `get`.
            return unsafe { &*current };
        }

        trace!("double-checked cell: running initializer");
        let fresh = Box::into_raw(Box::new(init()));
        self.ptr.store(fresh, Ordering::Release);
        // SAFETY: `fresh` came from `Box::into_raw` just above and is owned by
        // the cell until `drop`.
        unsafe { &*fresh }
    }
}

impl<T> Default for DoubleCheckedCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for DoubleCheckedCell<T> {
    fn drop(&mut self) {
        let current = *self.ptr.get_mut();
        if !current.is_null() {
            // SAFETY: `&mut self` proves no borrows handed out by `get` are
            // alive, and the pointer came from `Box::into_raw`.
            drop(unsafe { Box::from_raw(current) });
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for DoubleCheckedCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_tuple("DoubleCheckedCell");
        match self.get() {
            Some(value) => d.field(value),
            None => d.field(&format_args!("<uninit>")),
        };
        d.finish()
    }
}
