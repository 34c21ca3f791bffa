// src/checker/pool.rs
// =============================================================================
// This module fans a probe function out over many URLs concurrently.
//
// Key functionality:
// - Runs a caller-supplied probe over every URL in a batch
// - Caps how many probes are in flight at once (bounded concurrency)
// - Reports each result to an observer the moment it completes
// - Returns one outcome per URL, never fewer, never more
//
// Rust concepts:
// - Streams: buffer_unordered() is our worker pool
// - Generic closures: the probe and the observer are both injected
// - HashMap: the URL -> outcome result set
// =============================================================================

use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::future::Future;

use super::probe::ProbeOutcome;

// Checks a batch of URLs concurrently
//
// This is the core of the whole tool: everything else (sitemap resolution,
// the uptime monitor, the CLI) either feeds URLs in or interprets the
// outcomes that come back out.
//
// Parameters:
//   urls: the batch to check - callers deduplicate before submitting,
//         this function probes whatever it is handed, one probe per entry
//   probe: async function that checks ONE url and always produces an
//          outcome (transport faults come back as NetworkError, they are
//          never errors here - see checker::probe)
//   concurrency: how many probes may run at once; values below 1 are
//                clamped to 1 so the pool always makes progress
//   on_result: called once per URL as its probe completes, in completion
//              order - used for live progress lines
//
// Returns: a map from URL to outcome covering exactly the submitted URLs.
//
// Guarantees:
// - Does not return until every probe has completed
// - An empty batch returns an empty map without invoking the probe
// - One slow or failing URL never blocks the others beyond its own
//   timeout (that bounding lives inside the probe)
// - A panic inside the probe is a bug in the probe, not a network
//   condition: it propagates and aborts the batch rather than being
//   swallowed
pub async fn check_urls<P, Fut, O>(
    urls: Vec<String>,
    probe: P,
    concurrency: usize,
    mut on_result: O,
) -> HashMap<String, ProbeOutcome>
where
    P: Fn(String) -> Fut,
    Fut: Future<Output = ProbeOutcome>,
    O: FnMut(&str, ProbeOutcome),
{
    let limit = concurrency.max(1);
    let mut results = HashMap::with_capacity(urls.len());

    // Borrow the probe so each per-URL future can share it
    let probe = &probe;

    // Turn the batch into a stream of (url, outcome) futures and run up
    // to `limit` of them at once. "Unordered" means results arrive in
    // completion order, not submission order - exactly what we want for
    // live progress.
    let mut outcomes = stream::iter(urls.into_iter().map(|url| async move {
        let outcome = probe(url.clone()).await;
        (url, outcome)
    }))
    .buffer_unordered(limit);

    // Drain the stream: record each result and notify the observer
    while let Some((url, outcome)) = outcomes.next().await {
        on_result(&url, outcome);
        results.insert(url, outcome);
    }

    results
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Where is the worker pool?
//    - buffer_unordered(n) IS the pool: it polls up to n futures at a
//      time and yields each one's output as it finishes
//    - No threads are spawned; the tokio runtime multiplexes the waiting
//
// 2. Why `let probe = &probe;`?
//    - Each async block needs access to the probe function
//    - Moving it into the first block would leave nothing for the rest
//    - A shared reference is Copy, so every block gets its own copy of
//      the reference
//
// 3. Why does on_result take FnMut?
//    - Observers usually mutate something (print, count, collect)
//    - FnMut allows that; results arrive one at a time on this task, so
//      no locking is needed
//
// 4. Why clamp concurrency instead of erroring?
//    - A pool of zero workers would simply hang forever
//    - Clamping to 1 degrades to sequential checking, which is always
//      correct, just slower
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_result_keys_match_input_exactly() {
        let urls: Vec<String> = (0..25)
            .map(|i| format!("https://example.com/page/{}", i))
            .collect();
        let expected: HashSet<String> = urls.iter().cloned().collect();

        let results = check_urls(
            urls,
            |_url| async { ProbeOutcome::Status(200) },
            5,
            |_, _| {},
        )
        .await;

        let keys: HashSet<String> = results.keys().cloned().collect();
        assert_eq!(keys, expected);
    }

    #[tokio::test]
    async fn test_empty_batch_never_probes() {
        let probes = AtomicUsize::new(0);

        let results = check_urls(
            Vec::new(),
            |_url| {
                probes.fetch_add(1, Ordering::SeqCst);
                async { ProbeOutcome::Status(200) }
            },
            8,
            |_, _| {},
        )
        .await;

        assert!(results.is_empty());
        assert_eq!(probes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_one_timed_out_url_does_not_sink_the_batch() {
        let urls = vec![
            "https://a.test/fast".to_string(),
            "https://a.test/dead".to_string(),
            "https://a.test/slow".to_string(),
        ];

        let results = check_urls(
            urls,
            |url| async move {
                if url.ends_with("/dead") {
                    // Simulates a probe whose timeout fired
                    tokio::time::sleep(Duration::from_millis(30)).await;
                    ProbeOutcome::NetworkError
                } else {
                    ProbeOutcome::Status(200)
                }
            },
            2,
            |_, _| {},
        )
        .await;

        assert_eq!(results.len(), 3);
        assert_eq!(
            results.get("https://a.test/dead"),
            Some(&ProbeOutcome::NetworkError)
        );
        assert_eq!(
            results.get("https://a.test/fast"),
            Some(&ProbeOutcome::Status(200))
        );
        assert_eq!(
            results.get("https://a.test/slow"),
            Some(&ProbeOutcome::Status(200))
        );
    }

    #[tokio::test]
    async fn test_concurrency_stays_under_the_cap() {
        const CAP: usize = 3;

        let in_flight = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);

        let urls: Vec<String> = (0..20)
            .map(|i| format!("https://example.com/{}", i))
            .collect();

        check_urls(
            urls,
            |_url| async {
                // Record how many probes are alive on entry, including us
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);

                // Hold the slot briefly so probes overlap
                tokio::time::sleep(Duration::from_millis(10)).await;

                in_flight.fetch_sub(1, Ordering::SeqCst);
                ProbeOutcome::Status(200)
            },
            CAP,
            |_, _| {},
        )
        .await;

        let observed = peak.load(Ordering::SeqCst);
        assert!(
            observed <= CAP,
            "saw {} probes in flight, cap was {}",
            observed,
            CAP
        );
        // Sanity check: the pool did actually overlap work
        assert!(observed >= 2, "probes never ran concurrently");
    }

    #[tokio::test]
    async fn test_zero_concurrency_is_clamped_not_stuck() {
        let results = check_urls(
            vec!["https://example.com/".to_string()],
            |_url| async { ProbeOutcome::Status(200) },
            0,
            |_, _| {},
        )
        .await;

        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_observer_sees_every_completion() {
        let urls: Vec<String> = (0..10)
            .map(|i| format!("https://example.com/{}", i))
            .collect();
        let expected: HashSet<String> = urls.iter().cloned().collect();

        let mut seen = HashSet::new();
        check_urls(
            urls,
            |_url| async { ProbeOutcome::Status(204) },
            4,
            |url, outcome| {
                assert_eq!(outcome, ProbeOutcome::Status(204));
                seen.insert(url.to_string());
            },
        )
        .await;

        assert_eq!(seen, expected);
    }

    // The end-to-end shape of a sitemap run: ok page, missing page,
    // unreachable page, then the downstream not-found filter
    #[tokio::test]
    async fn test_ok_missing_down_scenario() {
        let urls = vec![
            "https://a.test/ok".to_string(),
            "https://a.test/missing".to_string(),
            "https://a.test/down".to_string(),
        ];

        let results = check_urls(
            urls,
            |url| async move {
                match url.as_str() {
                    "https://a.test/ok" => ProbeOutcome::Status(200),
                    "https://a.test/missing" => ProbeOutcome::Status(404),
                    _ => ProbeOutcome::NetworkError,
                }
            },
            3,
            |_, _| {},
        )
        .await;

        assert_eq!(results.get("https://a.test/ok"), Some(&ProbeOutcome::Status(200)));
        assert_eq!(
            results.get("https://a.test/missing"),
            Some(&ProbeOutcome::Status(404))
        );
        assert_eq!(
            results.get("https://a.test/down"),
            Some(&ProbeOutcome::NetworkError)
        );

        // The not-found filter picks out exactly the 404/410 URLs;
        // the unreachable one is reported through a different lens
        let not_found: Vec<&str> = results
            .iter()
            .filter(|(_, outcome)| outcome.is_not_found())
            .map(|(url, _)| url.as_str())
            .collect();
        assert_eq!(not_found, vec!["https://a.test/missing"]);

        let unreachable: Vec<&str> = results
            .iter()
            .filter(|(_, outcome)| **outcome == ProbeOutcome::NetworkError)
            .map(|(url, _)| url.as_str())
            .collect();
        assert_eq!(unreachable, vec!["https://a.test/down"]);
    }
}
