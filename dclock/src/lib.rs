//! # dclock
//!
//! Lazily-initialized singletons guarded by double-checked locking.
//!
//! This crate is a **façade** that re-exports the public items of
//! `dclock-core`.  Application code should depend on this crate rather than
//! on `dclock-core` directly.
//!
//! ## Quick start
//!
//! ```toml
//! [dependencies]
//! dclock = "0.1"
//! ```
//!
//! ```rust
//! use dclock::prelude::*;
//!
//! struct Limits { max_connections: usize }
//!
//! static LIMITS: LazySingleton<Limits> =
//!     LazySingleton::new(|| Ok(Limits { max_connections: 64 }));
//!
//! let limits = LIMITS.get()?;
//! assert_eq!(limits.max_connections, 64);
//! # Ok::<(), Error>(())
//! ```
//!
//! A holder does not have to be global.  Owned by a value it can be passed
//! down call chains by reference and frees its instance when dropped:
//!
//! ```rust
//! use dclock::prelude::*;
//!
//! struct Service { cache: LazySingleton<Vec<u32>> }
//!
//! fn warm(cache: &LazySingleton<Vec<u32>>) -> Result<usize> {
//!     Ok(cache.get()?.len())
//! }
//!
//! let service = Service { cache: LazySingleton::new(|| Ok(vec![1, 2, 3])) };
//! assert_eq!(warm(&service.cache)?, 3);
//! # Ok::<(), Error>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Holder, stats, trait, and error definitions.
pub use dclock_core as core;

pub use dclock_core::{define_singleton, ensure, fail, impl_singleton};

/// Commonly used items.
pub mod prelude {
    pub use dclock_core::{Error, LazySingleton, Result, Singleton, SingletonStats};
}
