//! # dclock-core
//!
//! Lazily-initialized singletons guarded by double-checked locking.
//!
//! This crate provides the building blocks re-exported by `dclock`: the
//! [`LazySingleton`] holder, its slow-path [`SingletonStats`], the
//! [`Singleton`] trait for type-level accessors, and the error hierarchy.

#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]

// ── Public modules ───────────────────────────────────────────────────────────

/// Error types and the `ensure!` / `fail!` macros.
pub mod errors;

/// The `Singleton` trait and `impl_singleton!` macro.
pub mod instance;

/// The `LazySingleton` holder and `define_singleton!` macro.
pub mod singleton;

/// Slow-path counters.
pub mod stats;

// ── Re-exports for convenience ────────────────────────────────────────────────

pub use errors::{Error, Result};
pub use instance::Singleton;
pub use singleton::LazySingleton;
pub use stats::SingletonStats;
