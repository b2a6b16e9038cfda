//! Lazily-built single instance guarded by double-checked locking.
//!
//! [`LazySingleton<T>`] owns at most one `T`, built on first access and then
//! shared by reference with every caller on every thread.
//!
//! * The fast path is a single `Acquire` load of an [`AtomicPtr`].  It takes
//!   no lock and writes nothing.
//! * The slow path takes a [`Mutex`], re-checks the pointer, runs the
//!   initializer and publishes the boxed result with a `Release` store.
//! * A failed (or panicking) initializer leaves the holder empty.  The error
//!   goes to the caller that ran it and the next access retries.
//!
//! A holder can sit in a `static` (see [`define_singleton!`]) or be owned by
//! a value and passed around by reference; an owned holder frees its instance
//! when it is dropped.
//!
//! [`define_singleton!`]: crate::define_singleton

use std::any::type_name;
use std::convert::Infallible;
use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ops::Deref;
use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, trace, warn};

use crate::errors::Error;
use crate::stats::{Counters, SingletonStats};

/// A lazily-initialized single instance of `T`.
///
/// `E` is the initializer's error type and `F` the initializer itself.  The
/// default `F` is a plain function pointer so that holders can be declared
/// in `static` items:
///
/// ```
/// use dclock_core::{Error, LazySingleton};
///
/// struct Pool { size: usize }
///
/// static POOL: LazySingleton<Pool> = LazySingleton::new(|| Ok(Pool { size: 8 }));
///
/// let pool = POOL.get()?;
/// assert_eq!(pool.size, 8);
/// assert!(std::ptr::eq(pool, POOL.get()?));
/// # Ok::<(), Error>(())
/// ```
pub struct LazySingleton<T, E = Error, F = fn() -> Result<T, E>> {
    instance: AtomicPtr<T>,
    lock: Mutex<()>,
    counters: Counters,
    init: F,
    _owns: PhantomData<(Box<T>, fn() -> E)>,
}

// SAFETY: the instance is built on whichever thread wins the lock and may be
// freed on the thread that drops the holder, so `T: Send`.  Shared access
// hands `&T` to every thread, so `T: Sync`.  `init` only ever runs under the
// mutex, one call at a time, so `F: Send` is enough.
unsafe impl<T: Send + Sync, E, F: Send> Sync for LazySingleton<T, E, F> {}

// SAFETY: moving the holder moves ownership of the boxed `T` with it.
unsafe impl<T: Send, E, F: Send> Send for LazySingleton<T, E, F> {}

impl<T, E, F> LazySingleton<T, E, F> {
    /// Creates an empty holder that will build its instance with `init`.
    pub const fn new(init: F) -> Self {
        Self {
            instance: AtomicPtr::new(ptr::null_mut()),
            lock: Mutex::new(()),
            counters: Counters::new(),
            init,
            _owns: PhantomData,
        }
    }

    /// Returns the instance if it has already been published.
    ///
    /// Never builds, never locks.
    #[inline]
    pub fn get_if_initialized(&self) -> Option<&T> {
        let ptr = self.instance.load(Ordering::Acquire);
        // SAFETY: a non-null pointer was published by `get_slow` with a
        // `Release` store after the box was fully written; the `Acquire`
        // load above makes those writes visible here.  The box is only
        // freed through `&mut self` or `self`, so it outlives this borrow.
        unsafe { ptr.as_ref() }
    }

    /// Whether the instance has been built.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        !self.instance.load(Ordering::Acquire).is_null()
    }

    /// Snapshot of the slow-path counters.
    pub fn stats(&self) -> SingletonStats {
        self.counters.snapshot()
    }

    /// Consumes the holder and returns the instance, if one was built.
    pub fn into_inner(mut self) -> Option<T> {
        let ptr = mem::replace(self.instance.get_mut(), ptr::null_mut());
        if ptr.is_null() {
            return None;
        }
        // SAFETY: `ptr` came from `Box::into_raw` in `get_slow` and was
        // swapped out above, so `Drop` will not free it again.
        Some(*unsafe { Box::from_raw(ptr) })
    }
}

impl<T, E, F> LazySingleton<T, E, F>
where
    F: Fn() -> Result<T, E>,
{
    /// Returns the instance, building it first if nobody has yet.
    ///
    /// Every successful call on every thread returns a reference to the
    /// same object.  If the initializer fails its error is returned to this
    /// caller only; the holder stays empty and the next call retries.
    #[inline]
    pub fn get(&self) -> Result<&T, E> {
        match self.get_if_initialized() {
            Some(instance) => Ok(instance),
            None => self.get_slow(),
        }
    }

    #[cold]
    fn get_slow(&self) -> Result<&T, E> {
        // A panicking initializer poisons the lock but leaves the pointer
        // null, which is exactly the state the next caller expects.
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.counters.record_lock();

        // Relaxed is enough: the mutex orders this load after the store made
        // by whoever held the lock last.
        let existing = self.instance.load(Ordering::Relaxed);
        if !existing.is_null() {
            trace!(
                instance = type_name::<T>(),
                "instance published while waiting for the lock"
            );
            // SAFETY: see `get_if_initialized`.
            return Ok(unsafe { &*existing });
        }

        self.counters.record_attempt();
        let unwinding = PanicCounter(&self.counters);
        let built = (self.init)();
        mem::forget(unwinding);

        match built {
            Ok(value) => {
                let ptr = Box::into_raw(Box::new(value));
                self.instance.store(ptr, Ordering::Release);
                self.counters.record_success();
                debug!(instance = type_name::<T>(), "instance constructed");
                // SAFETY: `ptr` is the box we just leaked; it lives until the
                // holder is dropped or consumed.
                Ok(unsafe { &*ptr })
            }
            Err(err) => {
                self.counters.record_failure();
                warn!(
                    instance = type_name::<T>(),
                    attempts = self.counters.snapshot().construction_attempts,
                    "instance construction failed"
                );
                Err(err)
            }
        }
    }
}

/// Counts an initializer panic as a failed attempt.  Forgotten on return.
struct PanicCounter<'a>(&'a Counters);

impl Drop for PanicCounter<'_> {
    fn drop(&mut self) {
        self.0.record_failure();
        warn!("instance initializer panicked");
    }
}

fn default_instance<T: Default>() -> Result<T, Infallible> {
    Ok(T::default())
}

impl<T: Default> LazySingleton<T, Infallible> {
    /// Holder whose instance is `T::default()`.
    pub const fn with_default() -> Self {
        Self::new(default_instance::<T>)
    }
}

impl<T, F> LazySingleton<T, Infallible, F>
where
    F: Fn() -> Result<T, Infallible>,
{
    /// Returns the instance of a holder whose initializer cannot fail.
    #[inline]
    pub fn instance(&self) -> &T {
        match self.get() {
            Ok(instance) => instance,
            Err(never) => match never {},
        }
    }
}

impl<T, F> Deref for LazySingleton<T, Infallible, F>
where
    F: Fn() -> Result<T, Infallible>,
{
    type Target = T;

    fn deref(&self) -> &T {
        self.instance()
    }
}

impl<T: fmt::Debug, E, F> fmt::Debug for LazySingleton<T, E, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("LazySingleton");
        match self.get_if_initialized() {
            Some(instance) => d.field("instance", instance),
            None => d.field("instance", &format_args!("<uninit>")),
        };
        d.field("stats", &self.stats()).finish()
    }
}

impl<T, E, F> Drop for LazySingleton<T, E, F> {
    fn drop(&mut self) {
        let ptr = *self.instance.get_mut();
        if !ptr.is_null() {
            // SAFETY: `&mut self` rules out outstanding borrows of the
            // instance, and `ptr` came from `Box::into_raw`.
            drop(unsafe { Box::from_raw(ptr) });
        }
    }
}

/// Define a singleton instance of type `$ty`.
///
/// The instance is lazily initialised on first access.  With a plain
/// expression the holder is infallible and derefs to `$ty`; prefix the
/// expression with `fallible` when it evaluates to
/// `Result<$ty, dclock_core::Error>`.
///
/// # Example
/// ```
/// use dclock_core::{define_singleton, fail};
///
/// struct Registry { data: Vec<String> }
/// define_singleton!(REGISTRY, Registry, Registry { data: Vec::new() });
///
/// assert!(REGISTRY.data.is_empty());
///
/// struct Device;
/// fn open_device() -> dclock_core::Result<Device> {
///     fail!("no device attached");
/// }
/// define_singleton!(DEVICE, Device, fallible open_device());
///
/// assert!(DEVICE.get().is_err());
/// assert!(!DEVICE.is_initialized());
/// ```
#[macro_export]
macro_rules! define_singleton {
    ($(#[$attr:meta])* $name:ident, $ty:ty, fallible $init:expr) => {
        $(#[$attr])*
        /// Lazily-initialised global singleton.
        pub static $name: $crate::singleton::LazySingleton<$ty> =
            $crate::singleton::LazySingleton::new(|| $init);
    };
    ($(#[$attr:meta])* $name:ident, $ty:ty, $init:expr) => {
        $(#[$attr])*
        /// Lazily-initialised global singleton.
        pub static $name: $crate::singleton::LazySingleton<$ty, ::std::convert::Infallible> =
            $crate::singleton::LazySingleton::new(|| ::std::result::Result::Ok($init));
    };
}
