//! Error types for dclock.
//!
//! A lazily-built instance can fail in exactly one way: its constructor
//! refuses to produce a value.  That is modelled as a single
//! `thiserror`-derived enum, plus the `ensure!` and `fail!` convenience
//! macros for writing constructors that return it.

use thiserror::Error;

/// The error type returned by fallible singleton constructors.
///
/// Holders are generic over their error type, so payloads that already have
/// an error type of their own can keep using it; this is the default.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Building the instance failed.  The holder stays empty and the next
    /// access retries.
    #[error("construction failed: {0}")]
    Construction(String),
}

/// Shorthand `Result` type used throughout dclock.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Returns `Err(Error::Construction(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use dclock_core::{ensure, errors::Error};
/// fn pool_size(n: usize) -> dclock_core::errors::Result<usize> {
///     ensure!(n > 0, "pool size must be positive, got {n}");
///     Ok(n)
/// }
/// assert!(pool_size(4).is_ok());
/// assert_eq!(
///     pool_size(0),
///     Err(Error::Construction("pool size must be positive, got 0".into()))
/// );
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Construction(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Construction(...))` immediately.
///
/// # Example
/// ```
/// use dclock_core::{fail, errors::Error};
/// fn always_err() -> dclock_core::errors::Result<()> {
///     fail!("backing store unavailable");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Construction(format!($($msg)*)))
    };
}
