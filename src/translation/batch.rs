/*!
 * Batch scheduling.
 *
 * Items are split into consecutive batches. All items of a batch run
 * concurrently; the next batch starts only when the whole batch has
 * finished, so at most `batch_size` calls are in flight. Results come back
 * in input order whatever order the calls complete in.
 */

use std::future::Future;

use futures::stream::{FuturesUnordered, StreamExt};
use log::debug;

/// Sizes of the batches `len` items are split into.
pub fn batch_sizes(len: usize, batch_size: usize) -> Vec<usize> {
    let batch_size = batch_size.max(1);
    (0..len)
        .step_by(batch_size)
        .map(|start| batch_size.min(len - start))
        .collect()
}

/// Run `work` over `items` batch by batch.
///
/// `on_complete` is called with the item's index as soon as each item
/// finishes. The returned results are in input order.
pub async fn run_batches<'a, T, R, F, Fut, P>(
    items: &'a [T],
    batch_size: usize,
    work: F,
    mut on_complete: P,
) -> Vec<R>
where
    F: Fn(&'a T) -> Fut,
    Fut: Future<Output = R>,
    P: FnMut(usize, &R),
{
    let batch_size = batch_size.max(1);
    let total_batches = items.len().div_ceil(batch_size);
    let mut results = Vec::with_capacity(items.len());

    for (batch_index, batch) in items.chunks(batch_size).enumerate() {
        let offset = batch_index * batch_size;
        debug!(
            "Starting batch {}/{} ({} items)",
            batch_index + 1,
            total_batches,
            batch.len()
        );

        let mut pending: FuturesUnordered<_> = batch
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let call = work(item);
                async move { (i, call.await) }
            })
            .collect();

        let mut slots: Vec<Option<R>> = batch.iter().map(|_| None).collect();
        while let Some((i, result)) = pending.next().await {
            on_complete(offset + i, &result);
            slots[i] = Some(result);
        }
        results.extend(slots.into_iter().flatten());
    }

    results
}
