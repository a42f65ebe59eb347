// ABOUTME: Integration tests for bounded concurrent tag enrichment.
// ABOUTME: Covers the concurrency cap, the lookup cap, partial failures, and tie ordering.

mod support;

use setimg::registry::{
    MAX_CONCURRENT_LOOKUPS, MAX_ENRICHED_TAGS, MAX_LISTED_TAGS, TagEnricher, VERY_OLD,
};
use std::sync::Arc;
use std::time::Duration;
use support::{InstrumentedFetcher, at};

fn names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("v{i:03}")).collect()
}

#[tokio::test(start_paused = true)]
async fn never_exceeds_concurrency_limit() {
    let tags = names(30);
    let fetcher = tags
        .iter()
        .enumerate()
        .fold(InstrumentedFetcher::new(), |f, (i, tag)| {
            f.created(tag, at(i as i64 + 1))
        })
        .with_delay(Duration::from_millis(50));

    let records = TagEnricher::new().enrich(&fetcher, "app", tags).await;

    assert_eq!(records.len(), MAX_LISTED_TAGS);
    assert_eq!(fetcher.max_in_flight(), MAX_CONCURRENT_LOOKUPS);
}

#[tokio::test(start_paused = true)]
async fn small_batches_run_fully_parallel() {
    let tags = names(3);
    let fetcher = tags
        .iter()
        .fold(InstrumentedFetcher::new(), |f, tag| f.created(tag, at(5)))
        .with_delay(Duration::from_millis(50));

    TagEnricher::new().enrich(&fetcher, "app", tags).await;
    assert_eq!(fetcher.max_in_flight(), 3);
}

#[tokio::test]
async fn only_first_fifty_tags_are_looked_up() {
    let tags = names(60);
    let fetcher = tags
        .iter()
        .fold(InstrumentedFetcher::new(), |f, tag| f.created(tag, at(10)));

    TagEnricher::new().enrich(&fetcher, "app", tags.clone()).await;

    let mut attempted = fetcher.attempted();
    attempted.sort();
    assert_eq!(attempted.len(), MAX_ENRICHED_TAGS);
    assert_eq!(attempted, tags[..MAX_ENRICHED_TAGS].to_vec());
}

#[tokio::test]
async fn all_failures_fall_back_to_alphabetical() {
    let tags: Vec<String> = ["zeta", "alpha", "mid"].map(String::from).to_vec();
    let fetcher = InstrumentedFetcher::new()
        .failing("zeta")
        .failing("alpha")
        .failing("mid");

    let records = TagEnricher::new().enrich(&fetcher, "app", tags).await;

    let order: Vec<_> = records.iter().map(|r| r.tag.as_str()).collect();
    assert_eq!(order, ["alpha", "mid", "zeta"]);
    assert!(records.iter().all(|r| r.created_at.is_none()));
}

#[tokio::test]
async fn fallback_sorts_tags_beyond_the_lookup_cap() {
    let mut tags: Vec<String> = (0..50).map(|i| format!("z{i:02}")).collect();
    tags.extend((0..10).map(|i| format!("a{i:02}")));
    // No tag is scripted, so every lookup fails.
    let fetcher = InstrumentedFetcher::new();

    let records = TagEnricher::new().enrich(&fetcher, "app", tags).await;

    assert_eq!(fetcher.attempted().len(), MAX_ENRICHED_TAGS);
    assert_eq!(records.len(), MAX_LISTED_TAGS);
    assert_eq!(records[0].tag, "a00");
    assert_eq!(records[9].tag, "a09");
    assert_eq!(records[10].tag, "z00");
}

#[tokio::test]
async fn enrichment_runs_on_a_spawned_task() {
    let tags = names(15);
    let fetcher = Arc::new(
        tags.iter()
            .fold(InstrumentedFetcher::new(), |f, tag| f.created(tag, at(7))),
    );

    let task = {
        let fetcher = Arc::clone(&fetcher);
        tokio::spawn(async move { TagEnricher::new().enrich(fetcher.as_ref(), "app", tags).await })
    };

    let records = task.await.unwrap();
    assert_eq!(records.len(), MAX_LISTED_TAGS.min(15));
    assert_eq!(fetcher.attempted().len(), 15);
}

#[tokio::test]
async fn partial_failures_drop_failed_tags() {
    let tags: Vec<String> = ["a", "b", "c"].map(String::from).to_vec();
    let fetcher = InstrumentedFetcher::new()
        .created("a", at(100))
        .failing("b")
        .created("c", at(300));

    let records = TagEnricher::new().enrich(&fetcher, "app", tags).await;

    let order: Vec<_> = records.iter().map(|r| r.tag.as_str()).collect();
    assert_eq!(order, ["c", "a"]);
}

#[tokio::test]
async fn missing_and_epoch_times_sort_last() {
    let tags: Vec<String> = ["none", "epoch", "real"].map(String::from).to_vec();
    let fetcher = InstrumentedFetcher::new()
        .without_time("none")
        .created("epoch", at(0))
        .created("real", at(1_700_000_000));

    let records = TagEnricher::new().enrich(&fetcher, "app", tags).await;

    assert_eq!(records[0].tag, "real");
    assert_eq!(records[1].created_at, Some(VERY_OLD));
    assert_eq!(records[2].created_at, Some(VERY_OLD));
    // Equal sentinels keep listing order.
    assert_eq!(records[1].tag, "none");
    assert_eq!(records[2].tag, "epoch");
}

#[tokio::test(start_paused = true)]
async fn ties_follow_listing_order_not_completion_order() {
    let tags: Vec<String> = ["first", "second", "third"].map(String::from).to_vec();
    let fetcher = InstrumentedFetcher::new()
        .created("first", at(42))
        .created("second", at(42))
        .created("third", at(42))
        .delay_for("first", Duration::from_millis(30))
        .delay_for("second", Duration::from_millis(20))
        .delay_for("third", Duration::from_millis(10));

    let records = TagEnricher::new().enrich(&fetcher, "app", tags).await;

    let order: Vec<_> = records.iter().map(|r| r.tag.as_str()).collect();
    assert_eq!(order, ["first", "second", "third"]);
}
