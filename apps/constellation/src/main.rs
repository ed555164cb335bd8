//! # Constellation - Save-File Tool
//!
//! The main binary for the constellation registry.
//!
//! This application provides:
//! - CLI interface for listing and editing constellations in a save file
//! - Membership reports against a JSON vessel roster
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────┐
//! │            apps/constellation (THE BINARY)        │
//! │                                                   │
//! │   ┌─────────────┐          ┌──────────────────┐   │
//! │   │    CLI      │          │  Save file and   │   │
//! │   │   (clap)    │          │  roster file I/O │   │
//! │   └──────┬──────┘          └────────┬─────────┘   │
//! │          └──────────────┬───────────┘             │
//! │                         ▼                         │
//! │              ┌────────────────────┐               │
//! │              │ constellation-core │               │
//! │              │    (THE LOGIC)     │               │
//! │              └────────────────────┘               │
//! └───────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! constellation init -S persistent.sfs
//! constellation add --frequency 42 --name Private --color 1,0,0,1
//! constellation list --roster vessels.json
//! constellation vessels --frequency 42 --roster vessels.json
//! ```

use clap::Parser;
use constellation::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Initialize tracing - CONSTELLATION_LOG_FORMAT=json enables machine-parseable output.
    let log_format =
        std::env::var("CONSTELLATION_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "constellation=debug,constellation_core=debug"
    } else {
        "constellation=info,constellation_core=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    // Logs go to stderr so --json-mode output on stdout stays parseable
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    // Display startup banner
    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    println!(
        r#"
  Constellation v{}

  Frequency-keyed vessel groups
"#,
        env!("CARGO_PKG_VERSION")
    );
}
