// src/core/parallel.rs
// Row-parallel dispatch over a worker thread pool.
// Both massively-parallel stages (atlas bake, raymarch pass) funnel through
// run_rows: one job per output row, results collected over a channel, and the
// collection loop is the stage barrier the caller relies on.

use std::sync::{mpsc, Arc};

use crate::error::{CloudError, CloudResult};

mod pool;

use pool::ThreadPool;

/// Worker count for a stage dispatch. Falls back to 4 if the host will not
/// report its parallelism.
pub fn worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Run `job(row)` for every row in `0..rows` across the worker pool and
/// return the results in row order.
///
/// Rows are independent units of work: workers share only the captured
/// immutable state. The function returns once every row has reported, so a
/// caller never observes a partially-completed stage.
pub fn run_rows<T, F>(rows: usize, job: F) -> CloudResult<Vec<T>>
where
    T: Send + 'static,
    F: Fn(usize) -> T + Send + Sync + 'static,
{
    if rows == 0 {
        return Ok(Vec::new());
    }

    let threads = worker_count().min(rows);
    let pool = ThreadPool::new(threads);
    let (sender, receiver) = mpsc::channel::<(usize, T)>();
    let job = Arc::new(job);

    for row in 0..rows {
        let sender = sender.clone();
        let job = Arc::clone(&job);
        pool.execute(move || {
            let value = job(row);
            // The receiver outlives the pool; a send failure means the
            // dispatcher already bailed, so the result can be dropped.
            let _ = sender.send((row, value));
        })
        .map_err(|_| CloudError::render("worker pool rejected a row job"))?;
    }
    drop(sender);

    let mut slots: Vec<Option<T>> = (0..rows).map(|_| None).collect();
    for _ in 0..rows {
        let (row, value) = receiver
            .recv()
            .map_err(|_| CloudError::render("a worker exited before completing its rows"))?;
        slots[row] = Some(value);
    }

    let mut out = Vec::with_capacity(rows);
    for slot in slots {
        match slot {
            Some(value) => out.push(value),
            None => return Err(CloudError::render("missing row result after dispatch")),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_rows_preserves_row_order() {
        let rows = run_rows(100, |row| row * 2).expect("dispatch succeeds");
        assert_eq!(rows.len(), 100);
        for (i, value) in rows.iter().enumerate() {
            assert_eq!(*value, i * 2);
        }
    }

    #[test]
    fn run_rows_handles_empty_dispatch() {
        let rows: Vec<u32> = run_rows(0, |_| 0).expect("empty dispatch succeeds");
        assert!(rows.is_empty());
    }

    #[test]
    fn run_rows_shares_captured_state_immutably() {
        let data = vec![3u64; 512];
        let rows = run_rows(8, move |row| data[row] + row as u64).expect("dispatch succeeds");
        assert_eq!(rows, vec![3, 4, 5, 6, 7, 8, 9, 10]);
    }
}
