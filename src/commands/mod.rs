//! Command definitions and implementations.
//!
//! Each command is defined in its own module with:
//! - The command struct with clap attributes for CLI parsing
//! - An `Execute` implementation producing a serializable result
//! - An `Outputable` implementation for table output

mod pattern;
mod where_clause;

pub use pattern::{PatternCmd, RelationDirection};
pub use where_clause::WhereCmd;

use clap::Subcommand;
use std::error::Error;

use crate::config::ConfigFile;
use crate::output::{OutputFormat, Outputable};

/// Trait for executing commands with command-specific result types.
pub trait Execute {
    type Output: Outputable;

    fn execute(self, config: &ConfigFile) -> Result<Self::Output, Box<dyn Error>>;
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a JSON condition document as a parameterized WHERE clause
    Where(WhereCmd),

    /// Render a node or relation pattern with its property conditions
    Pattern(PatternCmd),

    /// Catch-all for unknown commands
    #[command(external_subcommand)]
    Unknown(Vec<String>),
}

impl Command {
    /// Execute the command and return formatted output
    pub fn run(self, config: &ConfigFile, format: OutputFormat) -> Result<String, Box<dyn Error>> {
        match self {
            Command::Where(cmd) => {
                let result = cmd.execute(config)?;
                Ok(result.format(format))
            }
            Command::Pattern(cmd) => {
                let result = cmd.execute(config)?;
                Ok(result.format(format))
            }
            Command::Unknown(args) => {
                Err(format!("Unknown command: {}", args.first().unwrap_or(&String::new())).into())
            }
        }
    }
}
