//! # designpatterns
//!
//! Creational design patterns in Rust, starting with the Singleton.
//!
//! This crate is a **façade** that re-exports the public items of the
//! workspace crates and ships the `singleton-demo` binary.
//!
//! ```rust
//! use designpatterns::core::Singleton;
//!
//! let first = Singleton::instance("Value1");
//! let second = Singleton::instance("Value2");
//! assert_eq!(first.value(), second.value());
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Singleton variants, once-cells, contention probe, and errors.
pub use dp_core as core;

pub use dp_core::{
    contend, DoubleCheckedCell, Error, RaceReport, Result, Singleton, UnsyncCell,
    UnsyncSingleton, ValueHolder,
};
