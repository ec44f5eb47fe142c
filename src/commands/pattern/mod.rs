mod execute;
mod output;

use clap::{Args, ValueEnum};

use crate::builder::patterns::Direction;

/// Render a node or relation pattern with its property conditions
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  cypher_builder pattern -n p -l Person                          # (p:Person)
  cypher_builder pattern -n p -c '{\"name\": \"Alice\"}'            # Expanded conditions
  cypher_builder pattern -n p -c '{\"name\": \"Alice\"}' --condensed  # Single map parameter
  cypher_builder pattern -n r -l KNOWS,LIKES -r out              # -[r:KNOWS|LIKES]->")]
pub struct PatternCmd {
    /// Variable name bound to the pattern
    #[arg(short, long)]
    pub name: Option<String>,

    /// Node labels or relationship types (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub labels: Vec<String>,

    /// Property conditions as a JSON object
    #[arg(short, long)]
    pub conditions: Option<String>,

    /// Render a relation in the given direction instead of a node
    #[arg(short, long, value_enum)]
    pub relation: Option<RelationDirection>,

    /// Pass all conditions as a single map parameter
    #[arg(long, default_value_t = false)]
    pub condensed: bool,

    /// Also show the script with parameter values inlined
    #[arg(short, long, default_value_t = false)]
    pub interpolate: bool,
}

/// Direction of a relation pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RelationDirection {
    /// -[]->
    Out,
    /// <-[]-
    In,
    /// -[]-
    Either,
}

impl From<RelationDirection> for Direction {
    fn from(direction: RelationDirection) -> Self {
        match direction {
            RelationDirection::Out => Direction::Out,
            RelationDirection::In => Direction::In,
            RelationDirection::Either => Direction::Either,
        }
    }
}
