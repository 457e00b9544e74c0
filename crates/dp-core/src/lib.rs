//! # dp-core
//!
//! Core building blocks for designpatterns-rs.
//!
//! This crate provides the two Singleton variants ([`Singleton`], which is
//! thread-safe, and [`UnsyncSingleton`], which is not), the once-cells they
//! are built on, a contention probe that observes them under concurrent first
//! use, and the shared error type.

#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::undocumented_unsafe_blocks)]

// ── Public modules ───────────────────────────────────────────────────────────

/// Error types and the `ensure!` macro.
pub mod errors;

/// Design patterns: singleton variants and the cells behind them.
pub mod patterns;

/// Contention probe for singleton accessors.
pub mod race;

// ── Re-exports for convenience ────────────────────────────────────────────────

pub use errors::{Error, Result};
pub use patterns::double_checked::DoubleCheckedCell;
pub use patterns::singleton::{Singleton, ValueHolder};
pub use patterns::unsync_cell::UnsyncCell;
pub use patterns::unsync_singleton::UnsyncSingleton;
pub use race::{contend, RaceReport, MAX_CONTENDERS};
