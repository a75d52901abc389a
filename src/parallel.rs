#![warn(missing_docs)]
//! Generic parallel map over independent units of work.
use crate::error::{EflError, EflResult};
use log::debug;
use rayon::{prelude::*, ThreadPoolBuilder};
use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::atomic::{AtomicUsize, Ordering},
};

/// Map all `units` through `worker` on a dedicated thread pool.
///
/// The pool uses `nr_of_threads` threads or, if `None`, one thread per available core. The results are returned
/// in the order of `units`.
///
/// # Errors
///
/// This function returns an [`EflError::Worker`] if
///   - the thread pool cannot be created.
///   - the worker panics for one of the units. All other results are discarded in this case.
pub fn parallel_map<T, R, F>(
    units: Vec<T>,
    nr_of_threads: Option<usize>,
    worker: F,
) -> EflResult<Vec<R>>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Sync,
{
    let mut builder = ThreadPoolBuilder::new();
    if let Some(nr_of_threads) = nr_of_threads {
        builder = builder.num_threads(nr_of_threads);
    }
    let pool = builder
        .build()
        .map_err(|e| EflError::Worker(format!("could not create thread pool: {e}")))?;
    let nr_of_units = units.len();
    let completed = AtomicUsize::new(0);
    let results: Vec<std::thread::Result<R>> = pool.install(|| {
        units
            .into_par_iter()
            .map(|unit| {
                let result = panic::catch_unwind(AssertUnwindSafe(|| worker(unit)));
                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                debug!("finished unit {done}/{nr_of_units}");
                result
            })
            .collect()
    });
    results
        .into_iter()
        .map(|result| {
            result.map_err(|payload| {
                EflError::Worker(format!("unit of work failed: {}", panic_message(&*payload)))
            })
        })
        .collect()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".into()
    }
}
