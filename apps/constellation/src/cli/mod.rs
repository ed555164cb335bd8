//! # Constellation CLI Module
//!
//! This module implements the CLI interface for the constellation tool.
//!
//! ## Available Commands
//!
//! - `init` - Write the default constellation list to a new save file
//! - `list` - List constellations with member counts
//! - `show` - Show one frequency, with fallbacks
//! - `add` - Add a constellation
//! - `edit` - Rename or recolour a constellation
//! - `remove` - Remove a constellation
//! - `vessels` - List eligible vessels from the roster
//! - `check` - Check whether a frequency is valid

mod commands;

use clap::{Parser, Subcommand};
use constellation_core::ConstellationError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Constellation - frequency-keyed vessel groups
///
/// Manages the constellation list stored in a save file and reports which
/// vessels of a roster belong to each constellation.
#[derive(Parser, Debug)]
#[command(name = "constellation")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the save file
    #[arg(short = 'S', long, global = true, default_value = "persistent.sfs")]
    pub save_file: PathBuf,

    /// Path to a TOML settings file (compiled-in defaults otherwise)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Path to a JSON vessel roster (empty population otherwise)
    #[arg(long, global = true)]
    pub roster: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the default constellation list to a new save file
    Init {
        /// Overwrite an existing save file
        #[arg(short, long)]
        force: bool,
    },

    /// List constellations with member counts
    List,

    /// Show name, colour and member count of a frequency
    Show {
        /// Frequency to show
        #[arg(short, long)]
        frequency: i64,
    },

    /// Add a constellation
    Add {
        /// Frequency of the new constellation
        #[arg(short, long)]
        frequency: i64,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Colour as "r,g,b,a" with channels in [0, 1]
        #[arg(short, long)]
        color: Option<String>,
    },

    /// Rename or recolour a constellation
    Edit {
        /// Frequency of the constellation to edit
        #[arg(short, long)]
        frequency: i64,

        /// New display name
        #[arg(short, long)]
        name: Option<String>,

        /// New colour as "r,g,b,a"
        #[arg(short, long)]
        color: Option<String>,
    },

    /// Remove a constellation
    Remove {
        /// Frequency of the constellation to remove
        #[arg(short, long)]
        frequency: i64,
    },

    /// List eligible vessels from the roster
    Vessels {
        /// Only vessels tuned to this frequency
        #[arg(short, long)]
        frequency: Option<i64>,
    },

    /// Check whether a frequency is valid
    Check {
        /// Frequency to check
        #[arg(short, long, allow_negative_numbers = true)]
        frequency: i64,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), ConstellationError> {
    let json_mode = cli.json_mode;
    let files = SessionFiles {
        save_file: cli.save_file,
        settings: cli.settings,
        roster: cli.roster,
    };

    match cli.command {
        Some(Commands::Init { force }) => cmd_init(&files, force),
        Some(Commands::List) => cmd_list(&files, json_mode),
        Some(Commands::Show { frequency }) => cmd_show(&files, json_mode, frequency),
        Some(Commands::Add {
            frequency,
            name,
            color,
        }) => cmd_add(&files, frequency, &name, color.as_deref()),
        Some(Commands::Edit {
            frequency,
            name,
            color,
        }) => cmd_edit(&files, frequency, name, color.as_deref()),
        Some(Commands::Remove { frequency }) => cmd_remove(&files, frequency),
        Some(Commands::Vessels { frequency }) => cmd_vessels(&files, json_mode, frequency),
        Some(Commands::Check { frequency }) => cmd_check(json_mode, frequency),
        None => {
            // No subcommand - list by default
            cmd_list(&files, json_mode)
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
