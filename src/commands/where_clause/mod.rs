mod execute;
mod output;

use clap::Args;

/// Render a JSON condition document as a parameterized WHERE clause
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  cypher_builder where '{\"n\": {\"name\": \"Alice\"}}'              # Equality
  cypher_builder where '{\"n\": {\"age\": {\"$gt\": 18}}}'           # Comparator
  cypher_builder where '{\"$or\": [{\"a\": 1}, {\"b\": 2}]}'         # Explicit OR
  cypher_builder where '{\"n\": {\"name\": [\"a\", \"b\"]}}' -i      # With values inlined")]
pub struct WhereCmd {
    /// Condition document as JSON
    pub conditions: String,

    /// Maximum nesting depth of the document (overrides the config file)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=1024))]
    pub max_depth: Option<u32>,

    /// Also show the script with parameter values inlined
    #[arg(short, long, default_value_t = false)]
    pub interpolate: bool,
}
