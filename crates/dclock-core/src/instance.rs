//! Type-level singletons: `Type::instance()`.
//!
//! [`impl_singleton!`] gives a type a process-wide accessor backed by a
//! function-local `static` [`LazySingleton`](crate::singleton::LazySingleton),
//! so the type itself is the only way to reach its one instance.
//!
//! [`impl_singleton!`]: crate::impl_singleton

use crate::errors::Result;

/// A type with exactly one process-wide instance.
///
/// The instance is never dropped.  Implement this with [`impl_singleton!`]
/// rather than by hand.
///
/// [`impl_singleton!`]: crate::impl_singleton
pub trait Singleton: Sized + Send + Sync + 'static {
    /// Returns the instance, building it on first use.
    fn instance() -> Result<&'static Self>;
}

/// Implement [`Singleton`] for `$ty` using `$init`, an expression of type
/// `Result<$ty, dclock_core::Error>`.
///
/// # Example
/// ```
/// use dclock_core::{impl_singleton, Singleton};
///
/// pub struct Clock { ticks_per_second: u64 }
/// impl_singleton!(Clock, Ok(Clock { ticks_per_second: 1_000 }));
///
/// let clock = Clock::instance()?;
/// assert_eq!(clock.ticks_per_second, 1_000);
/// assert!(std::ptr::eq(clock, Clock::instance()?));
/// # Ok::<(), dclock_core::Error>(())
/// ```
#[macro_export]
macro_rules! impl_singleton {
    ($ty:ty, $init:expr) => {
        impl $crate::instance::Singleton for $ty {
            fn instance() -> $crate::errors::Result<&'static Self> {
                static INSTANCE: $crate::singleton::LazySingleton<$ty> =
                    $crate::singleton::LazySingleton::new(|| $init);
                INSTANCE.get()
            }
        }
    };
}
