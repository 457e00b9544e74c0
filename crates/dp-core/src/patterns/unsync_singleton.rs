//! Non-thread-safe Singleton.
//!
//! [`UnsyncSingleton`] follows the naive lazy recipe with no locking: check
//! the shared instance, and if there is none, build one and store it.
//! Called from one thread at a time it behaves exactly like
//! [`Singleton`][super::singleton::Singleton].  When first calls overlap,
//! each caller that saw an empty holder builds its own instance and the last
//! store wins.

use std::fmt;

use tracing::debug;

use super::singleton::ValueHolder;
use super::unsync_cell::UnsyncCell;

/// The lazily constructed singleton without synchronization.
///
/// # Example
/// ```
/// use dp_core::patterns::unsync_singleton::UnsyncSingleton;
///
/// let first = UnsyncSingleton::instance("Value1");
/// let second = UnsyncSingleton::instance("Value2");
/// assert_eq!(first.value(), "Value1");
/// assert_eq!(second.value(), "Value1");
/// ```
#[derive(Debug)]
pub struct UnsyncSingleton {
    value: String,
}

static INSTANCE: UnsyncCell<UnsyncSingleton> = UnsyncCell::new();

impl UnsyncSingleton {
    /// Return the process-wide instance, constructing it with `value` if it
    /// does not exist yet.
    ///
    /// Overlapping first calls may construct more than one instance.
    pub fn instance(value: &str) -> &'static UnsyncSingleton {
        INSTANCE.get_or_init(|| {
            debug!(value, "constructing unsynchronized singleton");
            UnsyncSingleton {
                value: value.to_owned(),
            }
        })
    }

    /// Return the stored instance if one has been constructed.
    pub fn get() -> Option<&'static UnsyncSingleton> {
        INSTANCE.get()
    }

    /// The value this instance was constructed with.
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl ValueHolder for UnsyncSingleton {
    fn value(&self) -> &str {
        UnsyncSingleton::value(self)
    }
}

impl fmt::Display for UnsyncSingleton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{ptr, thread};

    // The instance is process-wide, so only order-independent properties are
    // checked here.

    #[test]
    fn repeated_calls_share_one_instance() {
        let a = UnsyncSingleton::instance("unit-a");
        let b = UnsyncSingleton::instance("unit-b");
        assert!(ptr::eq(a, b));
        assert!(ptr::eq(UnsyncSingleton::get().unwrap(), a));
    }

    #[test]
    fn later_threads_get_the_same_instance() {
        let here = UnsyncSingleton::instance("unit-here");
        let there = thread::spawn(|| UnsyncSingleton::instance("unit-there"))
            .join()
            .unwrap();
        assert!(ptr::eq(here, there));
        assert_eq!(there.to_string(), here.value());
    }
}
