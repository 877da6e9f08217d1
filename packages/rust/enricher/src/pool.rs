//! Fixed-size worker pool over a shared index cursor.
//!
//! A bounded number of tasks pull work items by advancing one shared atomic
//! counter. Each worker collects `(index, result)` pairs for the items it
//! processed; the pairs are merged into per-item slots after all workers
//! join, so no two workers ever write the same slot.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Run `handler` over `items` with at most `concurrency` items in flight.
///
/// Returns one slot per item, in input order. A slot is `None` when the
/// handler returned `None` for that item.
pub(crate) async fn run_pool<T, R, F, Fut>(
    concurrency: usize,
    items: Vec<T>,
    handler: F,
) -> Vec<Option<R>>
where
    T: Clone + Send + Sync + 'static,
    R: Send + 'static,
    F: Fn(usize, T) -> Fut + Clone + Send + 'static,
    Fut: Future<Output = Option<R>> + Send + 'static,
{
    let total = items.len();
    let items = Arc::new(items);
    let cursor = Arc::new(AtomicUsize::new(0));
    let workers = concurrency.max(1).min(total.max(1));

    let mut handles = Vec::with_capacity(workers);
    for _ in 0..workers {
        let items = Arc::clone(&items);
        let cursor = Arc::clone(&cursor);
        let handler = handler.clone();

        handles.push(tokio::spawn(async move {
            let mut processed: Vec<(usize, Option<R>)> = Vec::new();
            loop {
                let i = cursor.fetch_add(1, Ordering::SeqCst);
                if i >= total {
                    break;
                }
                let item = items[i].clone();
                processed.push((i, handler(i, item).await));
            }
            processed
        }));
    }

    let mut slots: Vec<Option<R>> = Vec::with_capacity(total);
    slots.resize_with(total, || None);

    for handle in handles {
        if let Ok(processed) = handle.await {
            for (i, result) in processed {
                slots[i] = result;
            }
        }
    }

    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn at_most_k_items_in_flight_and_no_item_skipped() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let items: Vec<usize> = (0..10).collect();
        let handler = {
            let active = Arc::clone(&active);
            let peak = Arc::clone(&peak);
            move |_i: usize, item: usize| {
                let active = Arc::clone(&active);
                let peak = Arc::clone(&peak);
                async move {
                    let n = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(n, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    active.fetch_sub(1, Ordering::SeqCst);
                    Some(item * 2)
                }
            }
        };

        let slots = run_pool(3, items, handler).await;

        assert_eq!(peak.load(Ordering::SeqCst), 3);
        assert_eq!(slots.len(), 10);
        for (i, slot) in slots.iter().enumerate() {
            assert_eq!(*slot, Some(i * 2));
        }
    }

    #[tokio::test]
    async fn none_results_leave_empty_slots() {
        let items: Vec<usize> = (0..6).collect();
        let slots = run_pool(2, items, |_, item: usize| async move {
            if item % 2 == 0 { Some(item) } else { None }
        })
        .await;

        assert_eq!(slots, vec![Some(0), None, Some(2), None, Some(4), None]);
    }

    #[tokio::test]
    async fn zero_concurrency_is_clamped() {
        let slots = run_pool(0, vec![1, 2, 3], |_, item: i32| async move { Some(item) }).await;
        assert_eq!(slots, vec![Some(1), Some(2), Some(3)]);
    }

    #[tokio::test]
    async fn empty_input_yields_no_slots() {
        let slots =
            run_pool(4, Vec::<i32>::new(), |_, item: i32| async move { Some(item) }).await;
        assert!(slots.is_empty());
    }
}
