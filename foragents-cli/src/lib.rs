//! Command-line interface for the forAgents trending engine.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod trending;

pub use error::CliError;

use trending::{TrendingArgs, run_trending};

pub(crate) const ARG_ENTITIES: &str = "entities";
pub(crate) const ARG_COUNTERS_JSON: &str = "counters-json";
pub(crate) const ARG_COUNTERS_DB: &str = "counters-db";
pub(crate) const ARG_NOW: &str = "now";
pub(crate) const ARG_LIMIT: &str = "limit";
pub(crate) const ARG_HALF_LIFE_DAYS: &str = "half-life-days";
pub(crate) const ARG_MAX_AGE_DAYS: &str = "max-age-days";
pub(crate) const ARG_EXPLAIN: &str = "explain";
pub(crate) const ARG_OUTPUT: &str = "output";
pub(crate) const ENV_ENTITIES: &str = "FORAGENTS_CMDS_TRENDING_ENTITIES";

/// Run the forAgents CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when argument parsing, configuration layering,
/// counter loading or report output fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Trending(args) => run_trending(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "foragents",
    about = "Catalogue tooling for the forAgents directory",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rank catalogue entities by recency-weighted engagement.
    Trending(TrendingArgs),
}

#[cfg(test)]
mod tests;
