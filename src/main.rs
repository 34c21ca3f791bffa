// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Dispatch to the appropriate subcommand handler
// 3. Collect results and print them
// 4. Exit with proper code (0 = success, 1 = broken pages / sites down, 2 = error)
//
// Rust concepts used:
// - async/await: Because we need to make many network requests concurrently
// - Result<T, E>: For error handling (T = success type, E = error type)
// - match: Pattern matching to handle different subcommands
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli;           // src/cli.rs - command-line parsing
mod checker;       // src/checker/ - concurrent URL status checking
mod sitemap;       // src/sitemap/ - sitemap resolution logic
mod uptime;        // src/uptime/ - uptime monitoring logic

// Import items we need from our modules
use checker::{check_urls, ProbeOutcome, Prober};
use cli::{Cli, Commands};
use clap::Parser;  // Parser trait enables the parse() method
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

// anyhow::Result is like std::result::Result but simpler for applications
// It lets us return any error type with the ? operator
use anyhow::Result;

// User-Agent for the uptime monitor (the sitemap command takes --user-agent)
const UPTIME_USER_AGENT: &str = "site-sentinel/0.1";

// The #[tokio::main] attribute transforms our async main into a real main function
// It creates a tokio runtime and runs our async code inside it
#[tokio::main]
async fn main() {
    // Run our application logic and capture the exit code
    // std::process::exit() terminates the program with the given code
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // If an unexpected error occurred, print it and exit with code 2
            eprintln!("Error: {}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// This is the main application logic
// Returns:
//   Ok(0) = all pages fine / all sites up
//   Ok(1) = broken pages found / at least one site down
//   Ok(2) = internal error
//   Err = unexpected error
async fn run() -> Result<i32> {
    // Parse command-line arguments into our Cli struct
    // This will automatically handle --help, --version, etc.
    let cli = Cli::parse();

    // Match on which subcommand was used
    // Each branch handles a different command (sitemap, uptime)
    match cli.command {
        Commands::Sitemap {
            sitemap_url,
            json,
            concurrency,
            timeout,
            user_agent,
        } => {
            handle_sitemap_scan(&sitemap_url, json, concurrency, timeout, &user_agent).await
        }
        Commands::Uptime {
            sites,
            json,
            watch,
            interval,
            timeout,
            concurrency,
        } => handle_uptime(sites, json, watch, interval, timeout, concurrency).await,
    }
}

// One row of the sitemap report
//
// #[serde(flatten)] merges the outcome's fields into the row, so JSON
// output reads {"url": ..., "outcome": "status", "code": 404}
#[derive(Debug, Clone, Serialize)]
struct PageReport {
    url: String,
    #[serde(flatten)]
    outcome: ProbeOutcome,
}

// Handles the 'sitemap' subcommand
// Parameters:
//   sitemap_url: the sitemap (or sitemap index) to resolve
//   json: whether to output JSON format
//   concurrency: how many pages may be probed at once
//   timeout: per-request timeout in seconds
//   user_agent: User-Agent header for every request
async fn handle_sitemap_scan(
    sitemap_url: &str,
    json: bool,
    concurrency: usize,
    timeout: u64,
    user_agent: &str,
) -> Result<i32> {
    println!("🔍 Fetching sitemap: {}", sitemap_url);

    // One client for the sitemap downloads...
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout))
        .user_agent(user_agent)
        .build()?;

    // ...and one prober (with the HEAD-then-GET policy) for the pages
    let prober = Prober::new(Duration::from_secs(timeout), user_agent)?;

    // Recursively gather all page URLs
    let all_urls = sitemap::gather_urls(&client, sitemap_url).await?;

    if all_urls.is_empty() {
        println!("⚠️  No URLs found in the sitemap");
        return Ok(0);
    }

    println!("📄 Found {} URL(s) in the sitemap", all_urls.len());

    // Sort for a stable probing order (completion order still varies)
    let mut urls: Vec<String> = all_urls.into_iter().collect();
    urls.sort();

    println!("\n🌐 Checking {} URL(s) for HTTP status codes...\n", urls.len());

    // Fan the prober out over every page; the observer prints one live
    // progress line per completed probe ("ERR" when no status came back).
    // In JSON mode we stay quiet so stdout remains valid JSON.
    let prober = &prober;  // each probe future shares one prober
    let results = check_urls(
        urls,
        |url| async move { prober.probe(&url).await },
        concurrency,
        |url, outcome| {
            if !json {
                println!("{} {}", outcome, url);
            }
        },
    )
    .await;

    print_sitemap_results(&results, json)?;

    // Broken pages (404/410) decide the exit code
    let broken_count = results.values().filter(|o| o.is_not_found()).count();

    if broken_count > 0 {
        Ok(1)  // Exit code 1 = broken pages found
    } else {
        Ok(0)  // Exit code 0 = all good
    }
}

// Prints the sitemap results either as report sections or JSON
fn print_sitemap_results(results: &HashMap<String, ProbeOutcome>, json: bool) -> Result<()> {
    if json {
        // Serialize all rows to JSON and print
        let mut rows: Vec<PageReport> = results
            .iter()
            .map(|(url, outcome)| PageReport {
                url: url.clone(),
                outcome: *outcome,
            })
            .collect();
        rows.sort_by(|a, b| a.url.cmp(&b.url));

        let json_output = serde_json::to_string_pretty(&rows)?;
        println!("{}", json_output);
        return Ok(());
    }

    // The report the original tooling printed: 404/410 pages first,
    // then the URLs we could not reach at all
    let mut not_found: Vec<&str> = results
        .iter()
        .filter(|(_, outcome)| outcome.is_not_found())
        .map(|(url, _)| url.as_str())
        .collect();
    not_found.sort();

    let mut unreachable: Vec<&str> = results
        .iter()
        .filter(|(_, outcome)| **outcome == ProbeOutcome::NetworkError)
        .map(|(url, _)| url.as_str())
        .collect();
    unreachable.sort();

    println!();

    if not_found.is_empty() {
        println!("✅ No 404/410 URLs found");
    } else {
        println!("❌ Not Found ({}) URL(s) (404/410):\n", not_found.len());
        for url in &not_found {
            println!("   {}", url);
        }
    }

    if !unreachable.is_empty() {
        println!("\n⚠️  Unreachable ({}) URL(s) (no HTTP status):\n", unreachable.len());
        for url in &unreachable {
            println!("   {}", url);
        }
    }

    // Print summary
    println!("\n📊 Summary:");
    println!("   ✅ OK: {}", results.len() - not_found.len() - unreachable.len());
    println!("   ❌ Not found: {}", not_found.len());
    println!("   ⚠️  Unreachable: {}", unreachable.len());
    println!("   📋 Total: {}", results.len());

    Ok(())
}

// Handles the 'uptime' subcommand
// Parameters:
//   sites_file: optional JSON file with the site list (None = built-in list)
//   json: whether to output JSON format
//   watch: keep running, one round every `interval` seconds
//   interval: seconds between rounds in watch mode
//   timeout: per-request timeout in seconds
//   concurrency: how many sites may be checked at once
async fn handle_uptime(
    sites_file: Option<PathBuf>,
    json: bool,
    watch: bool,
    interval: u64,
    timeout: u64,
    concurrency: usize,
) -> Result<i32> {
    // Load the site list once, up front, so a bad file fails immediately
    let sites = match sites_file {
        Some(path) => uptime::load_sites(&path)?,
        None => uptime::default_sites(),
    };

    let prober = Prober::new(Duration::from_secs(timeout), UPTIME_USER_AGENT)?;

    loop {
        let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");

        if !json {
            println!("\n[{}] Running uptime check:", now);
        }

        // In JSON mode the live " url -> UP/DOWN" lines are suppressed
        let statuses = uptime::run_checks(&prober, &sites, concurrency, json).await;

        if json {
            println!("{}", serde_json::to_string_pretty(&statuses)?);
        }

        if !watch {
            // Single-round mode: any DOWN site fails the run
            let down_count = statuses.iter().filter(|s| !s.up).count();
            return Ok(if down_count > 0 { 1 } else { 0 });
        }

        // Watch mode: sleep until the next round
        tokio::time::sleep(Duration::from_secs(interval)).await;
    }
}
