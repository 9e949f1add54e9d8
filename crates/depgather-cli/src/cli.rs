//! CLI argument definitions for depgather.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "depgather",
    version,
    about = "Version range algebra and incremental dependency gathering",
    long_about = "depgather inspects NuGet-style version ranges and resolves the transitive \
                  dependency closure of packages against a local TOML feed."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inspect, test and combine version ranges
    Range {
        #[command(subcommand)]
        action: RangeAction,
    },

    /// Resolve the dependency closure of one or more packages
    Resolve {
        /// Root packages as `Id` or `Id@version`
        #[arg(required = true)]
        packages: Vec<String>,
        /// Target framework (e.g., net8.0); defaults to the config value
        #[arg(short, long)]
        framework: Option<String>,
        /// Include prerelease versions
        #[arg(long)]
        prerelease: bool,
        /// Feed file to resolve against
        #[arg(long, env = "DEPGATHER_FEED")]
        feed: Option<PathBuf>,
        /// Config file (default: ./depgather.toml)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Query only the needed version ranges instead of whole packages
        #[arg(long)]
        range_filter: bool,
        /// Print the closure as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum RangeAction {
    /// Show the normalized, short and legacy forms of a range
    Parse { range: String },
    /// Check which versions satisfy a range
    Satisfies {
        range: String,
        #[arg(required = true)]
        versions: Vec<String>,
    },
    /// Pick the best match for a range among candidate versions
    Best {
        range: String,
        #[arg(required = true)]
        versions: Vec<String>,
    },
    /// Check whether one range is contained in another
    Subset { subset: String, superset: String },
    /// Combine ranges into their covering range
    Combine {
        #[arg(required = true)]
        ranges: Vec<String>,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}
