// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Row-parallel dispatch.  A buffer is cut into rows; worker threads
//! pull rows off a shared queue until it runs dry.  Each row is
//! written by exactly one worker, so the only lock guards the queue
//! itself, and the result is identical whatever the thread count.

use std::sync::{Arc, Mutex};

use crate::errors::{Error, Result};

/// Calls `work(row_index, row)` once for every `row_len`-sized row of
/// `buffer`.  With one thread the rows are visited in order on the
/// calling thread; otherwise they are spread over scoped threads.
pub fn for_each_row<T, F>(buffer: &mut [T], row_len: usize, threads: usize, work: F) -> Result<()>
where
    T: Send,
    F: Fn(usize, &mut [T]) + Sync,
{
    if row_len == 0 || buffer.is_empty() {
        return Ok(());
    }
    let rows_total = (buffer.len() + row_len - 1) / row_len;
    let threads = threads.min(rows_total);

    if threads <= 1 {
        for (index, row) in buffer.chunks_mut(row_len).enumerate() {
            work(index, row);
        }
        return Ok(());
    }

    let rows = Arc::new(Mutex::new(buffer.chunks_mut(row_len).enumerate()));
    let work = &work;
    crossbeam::scope(|spawner| {
        for _ in 0..threads {
            let rows = rows.clone();
            spawner.spawn(move |_| loop {
                // A poisoned queue means another worker died; the scope
                // reports that, so this one just stops.
                let next = match rows.lock() {
                    Ok(mut rows) => rows.next(),
                    Err(_) => None,
                };
                match next {
                    Some((index, row)) => work(index, row),
                    None => break,
                }
            });
        }
    })
    .map_err(|_| Error::WorkerPanicked)
}
