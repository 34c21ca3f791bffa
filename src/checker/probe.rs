// src/checker/probe.rs
// =============================================================================
// This module probes a single URL for its HTTP status.
//
// Key functionality:
// - Makes a lightweight HEAD request first (no body download)
// - Falls back to one GET when the server rejects HEAD (403/405)
// - Follows redirects and reports the *final* status code
// - Collapses every transport failure into one NetworkError sentinel
//
// Rust concepts:
// - Enums: To represent "got a status" vs "got no status at all"
// - Generics + closures: The fallback policy takes its two attempts as
//   functions, so tests can swap real networking for stubs
// - Result<T, E>: Transport faults are Err, HTTP statuses are Ok
// =============================================================================

use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::time::Duration;

// The outcome of probing one URL
//
// Either we obtained an HTTP status code (after following redirects), or a
// transport-level fault (timeout, DNS, connect, TLS) prevented us from
// getting any status at all. The upstream Python scripts used 0 for the
// latter; an enum variant says the same thing without a magic number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "code", rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// Final HTTP status code after following redirects (e.g. 200, 404)
    Status(u16),
    /// No status obtained: timeout, DNS failure, connection refused, TLS error
    NetworkError,
}

impl ProbeOutcome {
    /// True for 404 Not Found and 410 Gone - the "broken page" statuses
    ///
    /// NetworkError is deliberately NOT "not found": an unreachable page
    /// is reported separately from a missing one.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProbeOutcome::Status(404) | ProbeOutcome::Status(410))
    }

    /// True when the site counts as up: any 2xx or 3xx final status
    ///
    /// This is the uptime monitor's definition (200..400). Client and
    /// server errors, and NetworkError, are all "down".
    pub fn is_up(&self) -> bool {
        matches!(self, ProbeOutcome::Status(code) if (200..400).contains(code))
    }
}

// Display the outcome the way the progress lines print it:
// the bare status code, or "ERR" when no status was obtained
impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::Status(code) => write!(f, "{}", code),
            ProbeOutcome::NetworkError => write!(f, "ERR"),
        }
    }
}

// One completed HTTP attempt, as the fallback policy sees it
//
// `redirected` records whether the request was redirected on the way to
// this status (the final URL differs from the one we asked for). We need
// it for the "404 at the end of a redirect chain" fallback trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempt {
    pub status: u16,
    pub redirected: bool,
}

// Decides whether a HEAD result is suspect enough to retry with GET
//
// Some origins return 405 (method not allowed) or 403 for HEAD while
// serving GET just fine; a 404 that only appeared after a redirect is
// equally untrustworthy. Everything else is taken at face value.
fn needs_get_fallback(head: &Attempt) -> bool {
    matches!(head.status, 403 | 405) || (head.status == 404 && head.redirected)
}

// The HEAD-then-GET probe policy
//
// This is the one genuinely non-trivial rule in the tool, so it lives
// apart from both the networking and the concurrency code:
// 1. Run the HEAD attempt
// 2. If its status is suspect (403/405, or 404 via a redirect), run the
//    GET attempt and use that status instead
// 3. A transport fault on either attempt yields NetworkError - a failed
//    HEAD is NOT retried as GET, matching the single-effort contract
//
// Parameters:
//   head: closure producing the HEAD attempt (called exactly once)
//   get: closure producing the GET attempt (called at most once)
//
// Both closures are generic so tests can pass stubs instead of sockets.
pub async fn head_then_get<H, HFut, G, GFut, E>(head: H, get: G) -> ProbeOutcome
where
    H: FnOnce() -> HFut,
    HFut: Future<Output = Result<Attempt, E>>,
    G: FnOnce() -> GFut,
    GFut: Future<Output = Result<Attempt, E>>,
{
    // First attempt: HEAD
    let first = match head().await {
        Ok(attempt) => attempt,
        Err(_) => return ProbeOutcome::NetworkError,
    };

    if !needs_get_fallback(&first) {
        // The common case: trust the HEAD status, no body ever downloaded
        return ProbeOutcome::Status(first.status);
    }

    // Fallback: one GET, and its status wins (even if it repeats the 403)
    match get().await {
        Ok(attempt) => ProbeOutcome::Status(attempt.status),
        Err(_) => ProbeOutcome::NetworkError,
    }
}

// A configured prober that performs real network round trips
//
// Holds a reqwest Client configured once with the caller-supplied timeout
// and User-Agent; the Client is cheap to clone, so one Prober is shared
// across all concurrent probes (connection pooling).
#[derive(Debug, Clone)]
pub struct Prober {
    client: Client,
}

impl Prober {
    /// Builds a prober with the given per-request timeout and User-Agent
    ///
    /// Redirects are followed (up to 10 hops) so every status we report
    /// is the final one in the chain.
    pub fn new(timeout: Duration, user_agent: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Prober { client })
    }

    /// Probes one page URL with the full HEAD-then-GET policy
    pub async fn probe(&self, url: &str) -> ProbeOutcome {
        head_then_get(
            || self.attempt(Method::HEAD, url),
            || self.attempt(Method::GET, url),
        )
        .await
    }

    /// Probes one URL with a single HEAD request, no GET fallback
    ///
    /// Used by the uptime monitor, which only wants reachability.
    pub async fn probe_head(&self, url: &str) -> ProbeOutcome {
        match self.attempt(Method::HEAD, url).await {
            Ok(attempt) => ProbeOutcome::Status(attempt.status),
            Err(_) => ProbeOutcome::NetworkError,
        }
    }

    // Performs one request and summarizes it as an Attempt
    //
    // The response body is never read: for GET we drop the response as
    // soon as the status line and headers are in, which closes the
    // connection without pulling the body over the wire.
    async fn attempt(&self, method: Method, url: &str) -> Result<Attempt, reqwest::Error> {
        let response = self.client.request(method, url).send().await?;

        // reqwest follows redirects internally, so the only trace left is
        // that the response's URL no longer matches the one we sent
        let redirected = response.url().as_str() != url;

        Ok(Attempt {
            status: response.status().as_u16(),
            redirected,
        })
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why is the policy a function of two closures?
//    - head_then_get() doesn't know (or care) about reqwest
//    - In production the closures make real requests; in tests they
//      return canned Attempts
//    - This is dependency injection, Rust style: generics instead of
//      interfaces/mocking frameworks
//
// 2. What is FnOnce?
//    - A closure that can be called at most one time
//    - Perfect here: HEAD happens exactly once, GET at most once
//    - The type system enforces "no retries" for free
//
// 3. Why not model NetworkError as an Err?
//    - Because it's an *answer*, not a failure of the checker
//    - Every URL always gets an outcome; callers filter on it
//    - Err is reserved for bugs and setup problems (see main.rs)
//
// 4. Why compare URLs to detect redirects?
//    - With redirects followed automatically, the client never shows us
//      the intermediate 3xx responses
//    - But response.url() is the *final* URL, so a mismatch with the
//      requested URL means at least one hop happened
// -----------------------------------------------------------------------------
