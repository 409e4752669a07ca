//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Subsidy - Match energy-saving projects to government subsidies
#[derive(Parser)]
#[command(name = "subsidy")]
#[command(about = "Find Taiwan energy-saving subsidies for a company profile", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to ~/.local/share/subsidy/config.toml, then built-in)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search subsidies for a company profile
    Search {
        #[command(flatten)]
        profile: ProfileArgs,

        /// Print the raw JSON result instead of cards
        #[arg(long)]
        json: bool,
    },

    /// Start the web server
    Serve {
        /// Port to listen on (defaults to config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (defaults to config)
        #[arg(long)]
        host: Option<String>,
    },

    /// Show the option catalogs for the profile fields
    Catalog {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the search prompt for a profile without calling the provider
    Prompt {
        #[command(flatten)]
        profile: ProfileArgs,

        /// List prompts and their override status instead
        #[arg(long)]
        list: bool,
    },

    /// Show the resolved configuration
    Config,
}

/// Company profile fields
///
/// Select fields take either the catalog label or its 1-based number as
/// shown by `subsidy catalog`.
#[derive(Args, Debug, Default, Clone)]
pub struct ProfileArgs {
    /// Company tax ID (統一編號)
    #[arg(long)]
    pub tax_id: Option<String>,

    /// Industry
    #[arg(long)]
    pub industry: Option<String>,

    /// Annual electricity bill in NTD
    #[arg(long)]
    pub bill: Option<String>,

    /// Planned project budget in NTD
    #[arg(long)]
    pub budget: Option<String>,

    /// Equipment type
    #[arg(long)]
    pub equipment: Option<String>,

    /// Energy-saving measure
    #[arg(long)]
    pub measure: Option<String>,

    /// Implementation time frame
    #[arg(long)]
    pub time: Option<String>,

    /// Contact phone
    #[arg(long)]
    pub phone: Option<String>,
}
