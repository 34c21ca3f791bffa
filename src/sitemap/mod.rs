// src/sitemap/mod.rs
// =============================================================================
// This module handles sitemap resolution.
//
// Features:
// - Recursively flattens sitemap indexes into a set of page URLs
// - Survives cyclic or repeated sitemap references (visited set)
// - Decompresses gzipped sitemaps (.gz)
// - Skips broken sitemaps with a warning instead of aborting
//
// Why sitemaps?
// - They are the site's own list of pages that should exist
// - Checking every listed page finds broken pages before visitors do
//
// Rust concepts:
// - Async programming: For the network fetches
// - Collections: HashSet for visited sitemaps, VecDeque for the queue
// =============================================================================

mod resolve;

// Re-export the main resolution function
pub use resolve::gather_urls;
