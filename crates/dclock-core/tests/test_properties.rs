//! Property tests: however many threads race and however many attempts
//! fail first, exactly one instance is built and everyone shares it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Barrier;
use std::thread;

use dclock_core::{Error, LazySingleton};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn one_instance_after_any_number_of_failures(
        threads in 2usize..12,
        failures in 0usize..4,
        seed in any::<u64>(),
    ) {
        let attempts = AtomicUsize::new(0);
        let holder = LazySingleton::new(|| {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            if n < failures {
                Err(Error::Construction(format!("attempt {n}")))
            } else {
                Ok(seed)
            }
        });
        let barrier = Barrier::new(threads);

        let seen: Vec<(usize, u64)> = thread::scope(|s| {
            let handles: Vec<_> = (0..threads)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        loop {
                            if let Ok(value) = holder.get() {
                                break (value as *const u64 as usize, *value);
                            }
                        }
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        prop_assert!(seen.iter().all(|&entry| entry == seen[0]));
        prop_assert_eq!(seen[0].1, seed);

        let stats = holder.stats();
        prop_assert_eq!(stats.construction_attempts, failures + 1);
        prop_assert_eq!(stats.construction_failures, failures);
        prop_assert_eq!(stats.successful_constructions(), 1);
        prop_assert!(stats.lock_acquisitions <= threads + failures);
    }

    #[test]
    fn sequential_access_is_stable(calls in 1usize..200) {
        let holder: LazySingleton<Vec<u8>> = LazySingleton::new(|| Ok(vec![0; 16]));
        let first = holder.get().unwrap() as *const Vec<u8>;
        for _ in 0..calls {
            prop_assert!(std::ptr::eq(holder.get().unwrap(), first));
        }
        prop_assert_eq!(holder.stats().lock_acquisitions, 1);
    }
}
