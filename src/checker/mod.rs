// src/checker/mod.rs
// =============================================================================
// This module contains all URL status checking logic.
//
// Submodules:
// - pool: Runs a probe over a batch of URLs with bounded concurrency
// - probe: The single-URL probe (HEAD with GET fallback) and its outcome type
//
// This file (mod.rs) is the module root - it ties everything together and
// exports the public API that other parts of our application can use.
//
// Rust concepts:
// - Modules: Organize code into namespaces
// - pub use: Re-export items to simplify imports for users of this module
// - async: Asynchronous code that can run concurrently
// =============================================================================

// Declare submodules (tells Rust to include these files)
mod pool;
mod probe;

// Re-export public items from submodules
// This lets users write `checker::check_urls()` instead of
// `checker::pool::check_urls()`
pub use pool::check_urls;
pub use probe::{ProbeOutcome, Prober};
