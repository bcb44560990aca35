// Bounded fan-out: title every topic with at most N calls in flight.
//
// A fixed pool of min(N, topics) workers pulls (index, topic) pairs from a
// shared queue. A worker takes the next topic only when its previous call
// has returned, so admission tracks completions rather than fixed batches
// and uneven latencies never push the in-flight count past N.
//
// Results go into a pre-sized slot per topic. Each index leaves the queue
// exactly once, so each slot is written by exactly one worker and output
// order equals input order whatever the completion order.
//
// Failure is fail-fast: the first failing topic ends the whole stage and
// every other in-flight call is dropped. No partial result is returned.

use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::{Mutex, OnceLock, PoisonError};
use std::time::Instant;

use futures::future::try_join_all;
use tracing::{debug, info, warn};

use super::traits::TopicTitler;
use crate::error::GenerationError;
use crate::topics::model::{AggregatedResult, TopicList, TopicTitles};

/// Default cap on concurrent model calls.
pub const DEFAULT_MAX_CONCURRENCY: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(n) => n,
    None => unreachable!(),
};

type WorkQueue<'a> = Mutex<VecDeque<(usize, &'a str)>>;

/// Generate titles for every topic, preserving topic order.
///
/// Issues exactly `topics.len()` calls on success. An empty list issues none
/// and yields an empty result.
pub async fn generate(
    topics: &TopicList,
    max_concurrency: NonZeroUsize,
    titler: &dyn TopicTitler,
) -> Result<AggregatedResult, GenerationError> {
    let total = topics.len();
    if total == 0 {
        warn!("No topics to generate titles for");
        return Ok(AggregatedResult::default());
    }

    let workers = max_concurrency.get().min(total);
    let queue: WorkQueue<'_> = Mutex::new(topics.iter().map(String::as_str).enumerate().collect());
    let slots: Vec<OnceLock<TopicTitles>> = (0..total).map(|_| OnceLock::new()).collect();

    info!(
        topics = total,
        workers,
        max_concurrency = max_concurrency.get(),
        "Generating titles"
    );
    let started = Instant::now();

    // try_join_all returns on the first Err and drops the remaining workers,
    // cancelling their in-flight calls.
    try_join_all((0..workers).map(|worker| run_worker(worker, &queue, &slots, titler))).await?;

    // Every worker returned Ok, so the queue is drained and every slot is set.
    let topic_titles: Vec<TopicTitles> = slots
        .into_iter()
        .filter_map(OnceLock::into_inner)
        .collect();
    debug_assert_eq!(topic_titles.len(), total, "unfilled slot after drain");

    info!(
        topics = total,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Titles generated"
    );

    Ok(AggregatedResult::new(topic_titles))
}

/// Pull topics until the queue is empty, writing each result into its slot.
async fn run_worker(
    worker: usize,
    queue: &WorkQueue<'_>,
    slots: &[OnceLock<TopicTitles>],
    titler: &dyn TopicTitler,
) -> Result<(), GenerationError> {
    loop {
        // Guard is dropped at the end of this statement, before the call
        let next = queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        let Some((index, topic)) = next else {
            debug!(worker, "Worker idle, queue drained");
            return Ok(());
        };

        debug!(worker, index, topic, "Dispatching topic");

        let titles = titler
            .titles_for(topic)
            .await
            .map_err(|source| {
                warn!(worker, index, topic, error = %source, "Title generation failed");
                GenerationError::Topic {
                    index,
                    topic: topic.to_string(),
                    source,
                }
            })?;

        let written = slots[index].set(titles).is_ok();
        debug_assert!(written, "slot {index} written twice");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InvocationError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Echoes the topic back after a delay; tracks peak concurrency.
    #[derive(Default)]
    struct CountingTitler {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TopicTitler for CountingTitler {
        async fn titles_for(&self, topic: &str) -> Result<TopicTitles, InvocationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(TopicTitles::new(topic, vec![format!("{topic} title")]))
        }
    }

    fn cap(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn default_cap_is_ten() {
        assert_eq!(DEFAULT_MAX_CONCURRENCY.get(), 10);
    }

    #[tokio::test]
    async fn empty_topic_list_makes_no_calls() {
        let titler = CountingTitler::default();
        let result = generate(&TopicList::default(), cap(4), &titler).await.unwrap();
        assert!(result.is_empty());
        assert_eq!(titler.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn never_exceeds_cap() {
        let titler = CountingTitler::default();
        let topics: TopicList = (0..9).map(|i| format!("t{i}")).collect();
        let result = generate(&topics, cap(3), &titler).await.unwrap();
        assert_eq!(result.len(), 9);
        assert_eq!(titler.calls.load(Ordering::SeqCst), 9);
        assert!(titler.peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn fewer_topics_than_cap_all_run_together() {
        let titler = CountingTitler::default();
        let topics: TopicList = ["a", "b", "c"].into_iter().collect();
        generate(&topics, cap(10), &titler).await.unwrap();
        assert_eq!(titler.peak.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn slots_follow_input_order() {
        let titler = CountingTitler::default();
        let topics: TopicList = ["x", "y", "z", "w"].into_iter().collect();
        let result = generate(&topics, cap(2), &titler).await.unwrap();
        assert_eq!(result.topics().collect::<Vec<_>>(), vec!["x", "y", "z", "w"]);
    }
}
