//! CLI argument parsing and command dispatch.

pub mod args;
pub mod fills;
pub mod stats;
pub mod watch;

pub use args::{Cli, Commands, OutputFormat};

use crate::error::Result;
use crate::storage::ResolvedConfig;

/// Run the parsed command with the resolved configuration.
///
/// # Errors
/// Returns the command's error.
pub async fn run(command: &Commands, config: &ResolvedConfig) -> Result<()> {
    match command {
        Commands::Stats(args) => stats::execute(args, config).await,
        Commands::Fills(args) => fills::execute(args, config).await,
        Commands::Watch(args) => watch::execute(args, config).await,
    }
}
