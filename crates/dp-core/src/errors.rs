//! Error types for designpatterns-rs.
//!
//! Constructing a singleton cannot fail, so nothing in
//! [`patterns`][crate::patterns] returns a `Result`.  The errors here come
//! from the machinery around it: argument validation and the threads spawned
//! by the [contention probe][crate::race].

use std::io;

use thiserror::Error;

/// The top-level error type used throughout designpatterns-rs.
#[derive(Debug, Error)]
pub enum Error {
    /// Precondition violated (raised by [`ensure!`][crate::ensure]).
    #[error("precondition not satisfied: {0}")]
    Precondition(String),

    /// The operating system refused to start a contender thread.
    #[error("failed to spawn contender {index}: {source}")]
    Spawn {
        /// Position of the contender that could not be started.
        index: usize,
        /// Underlying I/O error reported by the thread builder.
        #[source]
        source: io::Error,
    },

    /// A contender thread panicked before reporting what it observed.
    #[error("contender {index} panicked")]
    WorkerPanicked {
        /// Position of the contender that panicked.
        index: usize,
    },
}

/// Shorthand `Result` type used throughout designpatterns-rs.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Return `Err(Error::Precondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use dp_core::{ensure, errors::Error};
/// fn positive(n: usize) -> dp_core::errors::Result<usize> {
///     ensure!(n > 0, "n must be positive, got {n}");
///     Ok(n)
/// }
/// assert!(positive(1).is_ok());
/// assert!(matches!(positive(0), Err(Error::Precondition(_))));
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Precondition(
                format!($($msg)*)
            ));
        }
    };
}
