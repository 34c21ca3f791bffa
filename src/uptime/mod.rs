// src/uptime/mod.rs
// =============================================================================
// This module monitors a fixed list of site/locale combinations.
//
// Key functionality:
// - Expands each monitored site into one URL per locale
// - HEAD-checks every URL through the concurrent checker core
// - Classifies each as UP (final status 200-399) or DOWN (anything else)
// - Site list comes from a JSON file, or falls back to a built-in default
//
// Unlike the sitemap scan, uptime checks skip the GET fallback: we only
// care whether the origin answers at all, not whether it dislikes HEAD.
//
// Rust concepts:
// - Structs + serde derive: The sites file maps straight onto a struct
// - Slices: build_urls borrows the site list, it doesn't consume it
// =============================================================================

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::checker::{check_urls, ProbeOutcome, Prober};

// One site to monitor, with the locales it serves
//
// A site with locales expands to base/<locale> for each one; a site
// without locales is checked at its base URL alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoredSite {
    /// Base URL of the site (e.g. "https://www.example.com")
    pub base: String,
    /// Locale path segments to check under the base (may be empty)
    #[serde(default)]
    pub locales: Vec<String>,
}

// The verdict for one monitored URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteStatus {
    /// The URL that was checked
    pub url: String,
    /// Whether the site counts as up (final status 200-399)
    pub up: bool,
    /// The raw probe outcome, for anyone who wants the exact code
    #[serde(flatten)]  // This merges the outcome's fields into SiteStatus
    pub outcome: ProbeOutcome,
}

// The built-in site list, used when no --sites file is given
pub fn default_sites() -> Vec<MonitoredSite> {
    vec![
        MonitoredSite {
            base: "https://www.frontify.com".to_string(),
            locales: vec!["en".to_string(), "fr".to_string(), "de".to_string()],
        },
        MonitoredSite {
            base: "https://builtwith.frontify.com".to_string(),
            locales: Vec::new(),
        },
    ]
}

// Loads a site list from a JSON file
//
// The file is a JSON array of {"base": "...", "locales": ["...", ...]}
// objects; "locales" may be omitted.
pub fn load_sites(path: &Path) -> Result<Vec<MonitoredSite>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read sites file {}", path.display()))?;
    let sites: Vec<MonitoredSite> = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse sites file {}", path.display()))?;
    Ok(sites)
}

// Expands monitored sites into the flat list of URLs to check
//
// Example:
//   {base: "https://x.com/", locales: ["en", "de"]} -> x.com/en, x.com/de
//   {base: "https://y.com", locales: []}            -> y.com
pub fn build_urls(sites: &[MonitoredSite]) -> Vec<String> {
    let mut urls = Vec::new();

    for site in sites {
        // Trim trailing slashes so base + "/" + locale never doubles up
        let base = site.base.trim_end_matches('/');

        if site.locales.is_empty() {
            urls.push(base.to_string());
        } else {
            for locale in &site.locales {
                urls.push(format!("{}/{}", base, locale));
            }
        }
    }

    urls
}

// Runs one round of uptime checks over the given sites
//
// Every expanded URL is HEAD-checked concurrently; the observer prints
// a live " url -> UP/DOWN" line per completion. Results come back
// sorted by URL so successive rounds line up.
pub async fn run_checks(
    prober: &Prober,
    sites: &[MonitoredSite],
    concurrency: usize,
    quiet: bool,
) -> Vec<SiteStatus> {
    let urls = build_urls(sites);

    let results: HashMap<String, ProbeOutcome> = check_urls(
        urls,
        |url| async move { prober.probe_head(&url).await },
        concurrency,
        |url, outcome| {
            if !quiet {
                let status_text = if outcome.is_up() { "UP" } else { "DOWN" };
                println!(" {} -> {}", url, status_text);
            }
        },
    )
    .await;

    let mut statuses: Vec<SiteStatus> = results
        .into_iter()
        .map(|(url, outcome)| SiteStatus {
            url,
            up: outcome.is_up(),
            outcome,
        })
        .collect();
    statuses.sort_by(|a, b| a.url.cmp(&b.url));
    statuses
}
