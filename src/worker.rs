//! Named scoped worker threads with fatal-on-failure spawn and join.

use std::thread::{self, Scope, ScopedJoinHandle};

use crate::error::{HistoError, Result};

/// Spawn one named thread per job and join them all.
pub(crate) fn run_all<'scope, 'env, T, F>(
    scope: &'scope Scope<'scope, 'env>,
    phase: &'static str,
    jobs: impl IntoIterator<Item = F>,
) -> Result<Vec<T>>
where
    F: FnOnce() -> T + Send + 'scope,
    T: Send + 'scope,
{
    run_all_with(phase, jobs, |index, job| spawn(scope, phase, index, job))
}

fn run_all_with<'scope, T, F>(
    phase: &'static str,
    jobs: impl IntoIterator<Item = F>,
    mut spawn_one: impl FnMut(usize, F) -> Result<ScopedJoinHandle<'scope, T>>,
) -> Result<Vec<T>> {
    let mut handles = Vec::new();
    for (index, job) in jobs.into_iter().enumerate() {
        match spawn_one(index, job) {
            Ok(handle) => handles.push(handle),
            Err(e) => {
                // started workers are joined here, never left to panic the scope
                let _ = join_all(phase, handles);
                return Err(e);
            }
        }
    }
    join_all(phase, handles)
}

fn spawn<'scope, 'env, T, F>(
    scope: &'scope Scope<'scope, 'env>,
    phase: &'static str,
    index: usize,
    f: F,
) -> Result<ScopedJoinHandle<'scope, T>>
where
    F: FnOnce() -> T + Send + 'scope,
    T: Send + 'scope,
{
    thread::Builder::new()
        .name(format!("histo-{phase}-{index}"))
        .spawn_scoped(scope, f)
        .map_err(|source| HistoError::Spawn { phase, source })
}

/// Join every handle, in order. Any panic fails the whole phase.
fn join_all<T>(phase: &'static str, handles: Vec<ScopedJoinHandle<'_, T>>) -> Result<Vec<T>> {
    let mut results = Vec::with_capacity(handles.len());
    let mut failed = None;
    for (worker, handle) in handles.into_iter().enumerate() {
        match handle.join() {
            Ok(value) => results.push(value),
            Err(_) => {
                failed.get_or_insert(worker);
            }
        }
    }
    match failed {
        Some(worker) => Err(HistoError::WorkerPanicked { phase, worker }),
        None => Ok(results),
    }
}
