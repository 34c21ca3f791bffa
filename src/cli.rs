// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// clap is a popular Rust library for parsing command-line arguments.
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Rust concepts:
// - Structs: Custom data types that group related data
// - Enums: Types that can be one of several variants
// - Derive macros: Automatically generate code for our types
// =============================================================================

use clap::{Parser, Subcommand};
use std::path::PathBuf;

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
// The #[command(...)] attributes configure how the CLI behaves
#[derive(Parser, Debug)]
#[command(
    name = "site-sentinel",
    version = "0.1.0",
    about = "A CLI tool to find broken pages via sitemaps and monitor site uptime",
    long_about = "site-sentinel resolves a site's sitemap (including nested sitemap indexes) \
                  into its full list of pages and reports every page that returns 404/410 or \
                  cannot be reached. It can also run periodic UP/DOWN checks over a fixed list \
                  of site/locale combinations. Perfect for CI/CD pipelines and cron jobs."
)]
pub struct Cli {
    // The #[command(subcommand)] attribute tells clap that this field
    // will hold one of the subcommands defined in the Commands enum
    #[command(subcommand)]
    pub command: Commands,
}

// This enum defines our subcommands (sitemap, uptime)
//
// Each variant represents a different subcommand the user can run
// The fields inside each variant become the arguments for that subcommand
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a sitemap and report broken pages (404/410) and unreachable ones
    ///
    /// Example: site-sentinel sitemap https://www.example.com/sitemap.xml
    Sitemap {
        /// Sitemap URL, either a urlset or a sitemap index (nested indexes
        /// are followed recursively)
        ///
        /// This is a positional argument (required, no flag needed)
        sitemap_url: String,

        /// Output results in JSON format instead of a table
        ///
        /// This is an optional flag: --json
        #[arg(long)]
        json: bool,

        /// Maximum number of pages checked at the same time
        ///
        /// #[arg(long, default_value_t = 20)] creates --concurrency with a default
        #[arg(long, default_value_t = 20)]
        concurrency: usize,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = 40)]
        timeout: u64,

        /// User-Agent header sent with every request
        #[arg(long, default_value = "site-sentinel/0.1 (+https://github.com/vswaroop04/site-sentinel)")]
        user_agent: String,
    },

    /// HEAD-check a list of site/locale combinations and print UP/DOWN
    ///
    /// Example: site-sentinel uptime --watch --interval 1200
    Uptime {
        /// JSON file with the sites to monitor (array of {"base", "locales"})
        ///
        /// Without this flag the built-in default list is used
        #[arg(long)]
        sites: Option<PathBuf>,

        /// Output results in JSON format instead of plain lines
        #[arg(long)]
        json: bool,

        /// Keep running, repeating the checks every --interval seconds
        ///
        /// Without this flag one round is run and the program exits
        /// (the mode cron and CI schedulers want)
        #[arg(long)]
        watch: bool,

        /// Seconds between rounds in --watch mode (default: 20 minutes)
        #[arg(long, default_value_t = 1200)]
        interval: u64,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = 10)]
        timeout: u64,

        /// Maximum number of sites checked at the same time
        #[arg(long, default_value_t = 4)]
        concurrency: usize,
    },
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why use structs and enums?
//    - Structs group related data (like the CLI arguments)
//    - Enums represent choices (like "sitemap OR uptime")
//    - Both are core Rust types for organizing data
//
// 2. What are derive macros?
//    - #[derive(...)] automatically generates code for common operations
//    - Parser: generates CLI parsing logic
//    - Debug: generates code to print the struct for debugging
//
// 3. Why Option<PathBuf> for --sites?
//    - Option<T> means the flag may be absent
//    - None = use the built-in default list
//    - PathBuf (not String) because it names a file on disk
//
// 4. Why flags instead of environment variables?
//    - The original scripts read env vars (LOCAL_LOOP=1) and constants
//    - Explicit flags are discoverable via --help and testable via
//      injected values, so every knob is a flag with a default
// -----------------------------------------------------------------------------
