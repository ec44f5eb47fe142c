//! Parameterized Cypher query building.
//!
//! Callers describe conditions and patterns as values; this module renders them
//! into query text plus a table of named parameters, so no user-supplied value
//! is ever written into the text itself.
//!
//! # Architecture
//!
//! The query building system has three layers:
//!
//! 1. **Parameters** - `ParameterTable` allocates unique names, `Fragment` holds
//!    rendered text with parameter handles
//! 2. **Rendering** - conditions, comparators and patterns render into fragments
//! 3. **Assembly** - `Clause` implementations own a table, `Statement` merges them
//!    and `CompiledQuery` is the finalized result
//!
//! # Example
//!
//! ```
//! use cypher_builder::builder::clauses::{PatternClause, Raw, Statement, Where};
//! use cypher_builder::builder::comparators::between;
//! use cypher_builder::builder::conditions::Condition;
//! use cypher_builder::builder::patterns::node;
//! use cypher_builder::builder::Clause;
//! use serde_json::json;
//!
//! let person = node(Some(&json!("p")), Some(&json!("Person")), None).unwrap();
//! let mut statement = Statement::new();
//! statement
//!     .attach(PatternClause::matching(vec![vec![person.into()]]))
//!     .attach(Where::new(&Condition::map([(
//!         "p",
//!         Condition::map([("age", between(18, 65))]),
//!     )])))
//!     .attach(Raw::new("RETURN p"));
//!
//! let compiled = statement.compile().unwrap();
//! assert_eq!(
//!     compiled.script,
//!     "MATCH (p:Person)\nWHERE p.age >= $lowerAge AND p.age <= $upperAge\nRETURN p"
//! );
//! assert_eq!(compiled.params["lowerAge"], json!(18));
//! ```

pub mod classify;
pub mod clauses;
pub mod comparators;
pub mod conditions;
pub mod fragment;
pub mod helpers;
pub mod params;
pub mod pattern_conditions;
pub mod patterns;

use serde_json::{Map, Value};

use fragment::{FinalizeError, Fragment};
use params::ParameterTable;

/// Finalized query parameters (name -> value), in allocation order.
pub type Params = Map<String, Value>;

/// A piece of a query that owns the parameters it references.
pub trait Clause {
    /// Render the clause. Parameter references stay unresolved.
    fn build(&self) -> Fragment;

    /// The table holding this clause's parameters.
    fn parameters(&self) -> &ParameterTable;

    /// Give up the parameter table, typically to merge it into a parent.
    fn into_parameters(self) -> ParameterTable
    where
        Self: Sized;

    /// Get the number of parameters.
    fn param_count(&self) -> usize {
        self.parameters().len()
    }

    /// Render and resolve parameter names against this clause's own table.
    fn compile(&self) -> Result<CompiledQuery, FinalizeError> {
        CompiledQuery::from_clause(self)
    }
}

/// A compiled query ready for execution.
///
/// Contains the query script and all parameters it references.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub script: String,
    pub params: Params,
}

impl CompiledQuery {
    /// Create a compiled query from a clause.
    pub fn from_clause<C: Clause + ?Sized>(clause: &C) -> Result<Self, FinalizeError> {
        let table = clause.parameters();
        Ok(CompiledQuery {
            script: clause.build().finalize(table)?,
            params: table.values_by_name(),
        })
    }

    /// Get the number of parameters in this query.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// The script with parameters substituted as literals, for debugging only.
    pub fn interpolated(&self) -> String {
        helpers::interpolate(&self.script, &self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Minimal test Clause for testing
    struct TestClause {
        table: ParameterTable,
        fragment: Fragment,
    }

    impl TestClause {
        fn new(value: Value) -> Self {
            let mut table = ParameterTable::new();
            let id = table.allocate(value, Some("x"));
            let mut fragment = Fragment::text("RETURN ");
            fragment.push_param(id);
            Self { table, fragment }
        }
    }

    impl Clause for TestClause {
        fn build(&self) -> Fragment {
            self.fragment.clone()
        }

        fn parameters(&self) -> &ParameterTable {
            &self.table
        }

        fn into_parameters(self) -> ParameterTable {
            self.table
        }
    }

    #[test]
    fn test_compiled_query_from_clause() {
        let compiled = CompiledQuery::from_clause(&TestClause::new(json!(1))).unwrap();
        assert_eq!(compiled.script, "RETURN $x");
        assert_eq!(compiled.param_count(), 1);
    }

    #[test]
    fn test_param_count() {
        let clause = TestClause::new(json!("a"));
        assert_eq!(clause.param_count(), 1);
    }

    #[test]
    fn test_compiled_query_interpolated() {
        let compiled = TestClause::new(json!("it's")).compile().unwrap();
        assert_eq!(compiled.interpolated(), r"RETURN 'it\'s'");
    }

    #[test]
    fn test_compiled_query_clone() {
        let compiled = TestClause::new(json!(42)).compile().unwrap();
        let cloned = compiled.clone();
        assert_eq!(cloned, compiled);
    }
}
