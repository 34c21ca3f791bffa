// src/sitemap/resolve.rs
// =============================================================================
// This module flattens a sitemap (or nested sitemap index) into page URLs.
//
// How it works:
// 1. Start with the root sitemap URL in a queue
// 2. Fetch the document (decompressing .gz sitemaps when needed)
// 3. Collect its <url><loc> entries as page URLs
// 4. Add its <sitemap><loc> entries to the queue (if not visited)
// 5. Repeat until the queue is empty
//
// Sitemaps can reference each other, even in cycles, so a visited set
// guards the traversal - this is bounded graph traversal, same as the
// breadth-first site crawl pattern.
//
// Rust concepts:
// - HashSet: To track visited sitemaps and to deduplicate page URLs
// - VecDeque: Double-ended queue for breadth-first traversal
// - Url: For resolving relative child sitemap references
// =============================================================================

use anyhow::{anyhow, Result};
use flate2::read::GzDecoder;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::{HashSet, VecDeque};
use std::io::Read;
use url::Url;

// Gathers every page URL reachable from a sitemap
//
// Parameters:
//   client: shared HTTP client (carries the timeout and User-Agent)
//   root: the sitemap URL to start from - either a plain urlset or a
//         sitemap index pointing at further sitemaps
//
// Returns: the deduplicated set of page URLs found across all sitemaps.
//
// A sitemap that fails to download is logged and skipped; the traversal
// carries on with whatever else is queued. Only an invalid root URL is
// an error.
pub async fn gather_urls(client: &Client, root: &str) -> Result<HashSet<String>> {
    // Validate the starting point up front so typos fail fast
    Url::parse(root).map_err(|e| anyhow!("Invalid sitemap URL '{}': {}", root, e))?;

    // Queue of sitemaps still to fetch
    let mut queue = VecDeque::new();
    queue.push_back(root.to_string());

    // Track visited sitemaps to survive cyclic or repeated references
    let mut visited = HashSet::new();

    // The flat set of page URLs we hand back
    let mut pages = HashSet::new();

    // Process the queue until empty
    while let Some(sitemap_url) = queue.pop_front() {
        // insert() returns false if the sitemap was already visited
        if !visited.insert(sitemap_url.clone()) {
            continue;
        }

        println!("  Resolving sitemap: {}", sitemap_url);

        // Fetch the document; a broken sitemap doesn't sink the run
        let text = match fetch_sitemap_text(client, &sitemap_url).await {
            Ok(text) => text,
            Err(e) => {
                eprintln!("  Warning: Failed to fetch {}: {}", sitemap_url, e);
                continue;
            }
        };

        let (urls, children) = extract_locs(&text);
        pages.extend(urls);

        for child in children {
            // Child references may be relative to the parent sitemap
            if let Some(child_url) = resolve_child(&sitemap_url, &child) {
                if !visited.contains(&child_url) {
                    queue.push_back(child_url);
                }
            }
        }
    }

    Ok(pages)
}

// Downloads one sitemap document as text
//
// Sitemaps are often shipped gzipped (sitemap.xml.gz); we decompress
// when either the URL extension or the Content-Type says so. Bytes that
// aren't valid UTF-8 are replaced rather than rejected - a stray byte
// shouldn't cost us the whole document.
async fn fetch_sitemap_text(client: &Client, url: &str) -> Result<String> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(anyhow!("HTTP {}", response.status()));
    }

    // Grab the Content-Type before consuming the response body
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let bytes = response.bytes().await?;

    if url.ends_with(".gz") || content_type.contains("gzip") {
        let mut decoder = GzDecoder::new(bytes.as_ref());
        let mut decompressed = Vec::new();
        decoder.read_to_end(&mut decompressed)?;
        return Ok(String::from_utf8_lossy(&decompressed).into_owned());
    }

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

// Extracts (page URLs, child sitemap URLs) from a sitemap document
//
// A urlset wraps page entries in <url><loc>; a sitemap index wraps child
// sitemaps in <sitemap><loc>. The selectors "url > loc" and
// "sitemap > loc" keep the two apart, and one document may contain both.
fn extract_locs(text: &str) -> (Vec<String>, Vec<String>) {
    let document = Html::parse_document(text);

    // These selectors are string literals, so parse() cannot fail
    let page_selector = Selector::parse("url > loc").unwrap();
    let child_selector = Selector::parse("sitemap > loc").unwrap();

    let urls = collect_locs(&document, &page_selector);
    let children = collect_locs(&document, &child_selector);

    (urls, children)
}

// Collects the trimmed text of every element matching the selector
fn collect_locs(document: &Html, selector: &Selector) -> Vec<String> {
    document
        .select(selector)
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|loc| !loc.is_empty())
        .collect()
}

// Resolves a child sitemap reference against its parent sitemap's URL
//
// Handles both absolute references (the common case) and relative ones
// like "sitemap-news.xml". Unresolvable references are dropped.
fn resolve_child(parent: &str, child: &str) -> Option<String> {
    let base = Url::parse(parent).ok()?;
    let resolved = base.join(child).ok()?;

    // Sitemaps only ever point at http(s) resources
    if resolved.scheme() == "http" || resolved.scheme() == "https" {
        Some(resolved.to_string())
    } else {
        None
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a queue instead of recursion?
//    - Python's version recursed through nested indexes; in Rust an
//      async recursive function needs boxing, while a worklist loop
//      needs nothing special
//    - Same traversal, same visited-set guard, flatter code
//
// 2. What does visited.insert() returning bool buy us?
//    - HashSet::insert returns false when the value was already present
//    - That one call both marks and tests, so a sitemap index that
//      lists the same child twice (or points back at its parent) is
//      fetched only once
//
// 3. Why String::from_utf8_lossy?
//    - Real-world sitemaps occasionally contain invalid UTF-8
//    - "lossy" replaces bad bytes with U+FFFD instead of erroring
//    - Losing one character beats losing ten thousand URLs
//
// 4. Why "url > loc" and not just "loc"?
//    - A bare "loc" would match entries of both kinds
//    - The child combinator keeps page URLs and child sitemaps separate,
//      which is the whole point of the two lists
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_from_urlset() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://example.com/</loc></url>
  <url><loc>https://example.com/pricing</loc><lastmod>2024-01-01</lastmod></url>
</urlset>"#;

        let (urls, children) = extract_locs(xml);
        assert_eq!(
            urls,
            vec!["https://example.com/", "https://example.com/pricing"]
        );
        assert!(children.is_empty());
    }

    #[test]
    fn test_extract_from_sitemap_index() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap><loc>https://example.com/sitemap-pages.xml</loc></sitemap>
  <sitemap><loc>https://example.com/sitemap-blog.xml</loc></sitemap>
</sitemapindex>"#;

        let (urls, children) = extract_locs(xml);
        assert!(urls.is_empty());
        assert_eq!(
            children,
            vec![
                "https://example.com/sitemap-pages.xml",
                "https://example.com/sitemap-blog.xml"
            ]
        );
    }

    #[test]
    fn test_extract_mixed_document() {
        // Not strictly standard, but seen in the wild: one document
        // carrying both page entries and child sitemaps
        let xml = r#"<root>
  <url><loc>https://example.com/about</loc></url>
  <sitemap><loc>https://example.com/sitemap-2.xml</loc></sitemap>
</root>"#;

        let (urls, children) = extract_locs(xml);
        assert_eq!(urls, vec!["https://example.com/about"]);
        assert_eq!(children, vec!["https://example.com/sitemap-2.xml"]);
    }

    #[test]
    fn test_extract_trims_whitespace_and_drops_empty() {
        let xml = r#"<urlset>
  <url><loc>
    https://example.com/padded
  </loc></url>
  <url><loc>   </loc></url>
</urlset>"#;

        let (urls, _) = extract_locs(xml);
        assert_eq!(urls, vec!["https://example.com/padded"]);
    }

    #[test]
    fn test_extract_from_garbage_yields_nothing() {
        let (urls, children) = extract_locs("this is not xml at all");
        assert!(urls.is_empty());
        assert!(children.is_empty());
    }

    #[test]
    fn test_resolve_absolute_child() {
        let result = resolve_child(
            "https://example.com/sitemap.xml",
            "https://cdn.example.com/sitemap-img.xml",
        );
        assert_eq!(
            result,
            Some("https://cdn.example.com/sitemap-img.xml".to_string())
        );
    }

    #[test]
    fn test_resolve_relative_child() {
        let result = resolve_child("https://example.com/sitemaps/index.xml", "pages.xml");
        assert_eq!(
            result,
            Some("https://example.com/sitemaps/pages.xml".to_string())
        );
    }

    #[test]
    fn test_resolve_rejects_non_http_schemes() {
        let result = resolve_child("https://example.com/sitemap.xml", "ftp://example.com/x.xml");
        assert_eq!(result, None);
    }
}
