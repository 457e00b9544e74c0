//! Thread-safe Singleton.
//!
//! [`Singleton`] is a process-wide value holding one immutable string.  The
//! first call to [`Singleton::instance`] decides that string; every later
//! call, from any thread, gets the same instance back and its argument is
//! ignored.
//!
//! The instance lives in a static [`DoubleCheckedCell`], so the common case
//! (instance already built) is a single `Acquire` load with no locking.

use std::fmt;

use tracing::debug;

use super::double_checked::DoubleCheckedCell;

/// Read access shared by both singleton variants.
pub trait ValueHolder {
    /// The value the instance was constructed with.
    fn value(&self) -> &str;
}

/// The thread-safe, lazily constructed singleton.
///
/// There is no public constructor; the only way to obtain one is
/// [`Singleton::instance`].
///
/// # Example
/// ```
/// use dp_core::patterns::singleton::Singleton;
///
/// let first = Singleton::instance("Value1");
/// let second = Singleton::instance("Value2");
/// assert!(std::ptr::eq(first, second));
/// assert_eq!(first.value(), second.value());
/// ```
#[derive(Debug)]
pub struct Singleton {
    value: String,
}

static INSTANCE: DoubleCheckedCell<Singleton> = DoubleCheckedCell::new();

impl Singleton {
    /// Return the process-wide instance, constructing it with `value` if it
    /// does not exist yet.
    ///
    /// Safe to call from any number of threads at once: exactly one
    /// constructs the instance and all of them receive it.
    pub fn instance(value: &str) -> &'static Singleton {
        INSTANCE.get_or_init(|| {
            debug!(value, "constructing thread-safe singleton");
            Singleton {
                value: value.to_owned(),
            }
        })
    }

    /// Return the instance if it has already been constructed.
    pub fn get() -> Option<&'static Singleton> {
        INSTANCE.get()
    }

    /// The value this instance was constructed with.
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl ValueHolder for Singleton {
    fn value(&self) -> &str {
        Singleton::value(self)
    }
}

impl fmt::Display for Singleton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}
