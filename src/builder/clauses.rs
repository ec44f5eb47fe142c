//! Clauses that own a parameter table, and the statement that merges them.
//!
//! Each clause renders into its own [`ParameterTable`]. Attaching a clause to a
//! [`Statement`] merges that table into the statement's, renaming colliding
//! parameters; rendered fragments keep pointing at the right parameters because
//! they hold handles, not names.

use log::debug;
use serde_json::Value;

use super::classify::ConditionError;
use super::conditions::{render_conditions, Condition};
use super::fragment::Fragment;
use super::params::ParameterTable;
use super::pattern_conditions::ConditionMode;
use super::patterns::Pattern;
use super::Clause;

/// A clause made of comma-separated paths: `MATCH`, `CREATE`, `MERGE`.
#[derive(Debug, Clone)]
pub struct PatternClause {
    keyword: &'static str,
    paths: Vec<Fragment>,
    table: ParameterTable,
}

impl PatternClause {
    fn new(keyword: &'static str, mode: ConditionMode, paths: Vec<Vec<Pattern>>) -> Self {
        let mut table = ParameterTable::new();
        let mut rendered = Vec::with_capacity(paths.len());

        for path in paths {
            let mut fragment = Fragment::new();
            for mut pattern in path {
                pattern.set_condition_mode(mode);
                fragment.append(pattern.build());
                table.merge(pattern.into_parameters());
            }
            rendered.push(fragment);
        }

        Self {
            keyword,
            paths: rendered,
            table,
        }
    }

    /// `MATCH`; pattern conditions are expanded.
    pub fn matching(paths: Vec<Vec<Pattern>>) -> Self {
        Self::new("MATCH", ConditionMode::Expanded, paths)
    }

    /// `OPTIONAL MATCH`; pattern conditions are expanded.
    pub fn optional_matching(paths: Vec<Vec<Pattern>>) -> Self {
        Self::new("OPTIONAL MATCH", ConditionMode::Expanded, paths)
    }

    /// `CREATE`; pattern conditions are condensed.
    pub fn create(paths: Vec<Vec<Pattern>>) -> Self {
        Self::new("CREATE", ConditionMode::Condensed, paths)
    }

    /// `MERGE`; pattern conditions are condensed.
    pub fn merge(paths: Vec<Vec<Pattern>>) -> Self {
        Self::new("MERGE", ConditionMode::Condensed, paths)
    }
}

impl Clause for PatternClause {
    fn build(&self) -> Fragment {
        let mut fragment = Fragment::text(format!("{} ", self.keyword));
        fragment.append(Fragment::join(self.paths.iter().cloned(), ", "));
        fragment
    }

    fn parameters(&self) -> &ParameterTable {
        &self.table
    }

    fn into_parameters(self) -> ParameterTable {
        self.table
    }
}

/// `WHERE <condition>`
#[derive(Debug, Clone)]
pub struct Where {
    condition: Fragment,
    table: ParameterTable,
}

impl Where {
    pub fn new(condition: &Condition) -> Self {
        let mut table = ParameterTable::new();
        let condition = render_conditions(&mut table, condition);
        Self { condition, table }
    }

    /// Classify a JSON condition document and render it.
    pub fn from_json(value: &Value, max_depth: usize) -> Result<Self, ConditionError> {
        let condition = Condition::from_json_with_limit(value, max_depth)?;
        Ok(Self::new(&condition))
    }
}

impl Clause for Where {
    /// An empty condition renders no clause at all.
    fn build(&self) -> Fragment {
        if self.condition.is_empty() {
            return Fragment::new();
        }
        let mut fragment = Fragment::text("WHERE ");
        fragment.append(self.condition.clone());
        fragment
    }

    fn parameters(&self) -> &ParameterTable {
        &self.table
    }

    fn into_parameters(self) -> ParameterTable {
        self.table
    }
}

/// Literal query text with no parameters, e.g. `RETURN n`.
#[derive(Debug, Clone)]
pub struct Raw {
    text: String,
    table: ParameterTable,
}

impl Raw {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            table: ParameterTable::new(),
        }
    }
}

impl Clause for Raw {
    fn build(&self) -> Fragment {
        Fragment::text(self.text.as_str())
    }

    fn parameters(&self) -> &ParameterTable {
        &self.table
    }

    fn into_parameters(self) -> ParameterTable {
        self.table
    }
}

/// A sequence of clauses sharing one parameter table.
#[derive(Debug, Clone, Default)]
pub struct Statement {
    clauses: Vec<Fragment>,
    table: ParameterTable,
}

impl Statement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a clause, taking over its parameters.
    pub fn attach<C: Clause>(&mut self, clause: C) -> &mut Self {
        let fragment = clause.build();
        let params = clause.into_parameters();
        debug!(
            "attaching clause with {} parameter(s) to statement",
            params.len()
        );
        self.table.merge(params);
        if !fragment.is_empty() {
            self.clauses.push(fragment);
        }
        self
    }

    pub fn clause_count(&self) -> usize {
        self.clauses.len()
    }
}

impl Clause for Statement {
    /// Clauses are separated by newlines.
    fn build(&self) -> Fragment {
        Fragment::join(self.clauses.iter().cloned(), "\n")
    }

    fn parameters(&self) -> &ParameterTable {
        &self.table
    }

    fn into_parameters(self) -> ParameterTable {
        self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::comparators::greater_than;
    use crate::builder::patterns::{node, relation, Direction};
    use rstest::rstest;
    use serde_json::json;

    fn person(name: &str, conditions: Value) -> Pattern {
        node(Some(&json!(name)), Some(&json!("Person")), Some(&conditions))
            .unwrap()
            .into()
    }

    #[rstest]
    fn test_match_expands_conditions() {
        let clause = PatternClause::matching(vec![vec![person("n", json!({"name": "A"}))]]);
        let compiled = clause.compile().unwrap();
        assert_eq!(compiled.script, "MATCH (n:Person { name: $name })");
        assert_eq!(compiled.params["name"], json!("A"));
    }

    #[rstest]
    fn test_create_condenses_conditions() {
        let clause = PatternClause::create(vec![vec![person("n", json!({"name": "A", "age": 3}))]]);
        let compiled = clause.compile().unwrap();
        assert_eq!(compiled.script, "CREATE (n:Person $conditions)");
        assert_eq!(compiled.params.len(), 1);
        assert_eq!(compiled.params["conditions"], json!({"name": "A", "age": 3}));
    }

    #[rstest]
    fn test_paths_within_clause_get_unique_names() {
        let path = vec![
            person("a", json!({"name": "A"})),
            relation(Direction::Out, Some(&json!("r")), Some(&json!("KNOWS")), None)
                .unwrap()
                .into(),
            person("b", json!({"name": "B"})),
        ];
        let clause = PatternClause::matching(vec![path, vec![person("c", json!({"name": "C"}))]]);
        let compiled = clause.compile().unwrap();
        assert_eq!(
            compiled.script,
            "MATCH (a:Person { name: $name })-[r:KNOWS]->(b:Person { name: $name2 }), (c:Person { name: $name3 })"
        );
        assert_eq!(compiled.params["name2"], json!("B"));
        assert_eq!(compiled.params["name3"], json!("C"));
    }

    #[rstest]
    fn test_statement_merges_clause_tables() {
        let mut statement = Statement::new();
        statement
            .attach(PatternClause::matching(vec![vec![person("n", json!({"age": 30}))]]))
            .attach(Where::new(&Condition::map([("n", Condition::map([("age", greater_than(18))]))])))
            .attach(Raw::new("RETURN n"));

        let compiled = statement.compile().unwrap();
        assert_eq!(
            compiled.script,
            "MATCH (n:Person { age: $age })\nWHERE n.age > $age2\nRETURN n"
        );
        assert_eq!(compiled.params["age"], json!(30));
        assert_eq!(compiled.params["age2"], json!(18));
    }

    #[rstest]
    fn test_where_from_json() {
        let clause = Where::from_json(&json!({"n": {"name": ["a", "b"]}}), 8).unwrap();
        assert_eq!(
            clause.compile().unwrap().script,
            "WHERE n.name = $name OR n.name = $name2"
        );
    }

    #[rstest]
    fn test_where_from_json_rejects_deep_documents() {
        assert!(Where::from_json(&json!([[[1]]]), 2).is_err());
    }

    #[rstest]
    fn test_empty_where_is_skipped() {
        let mut statement = Statement::new();
        statement
            .attach(Raw::new("MATCH (n)"))
            .attach(Where::new(&Condition::map(Vec::<(String, Condition)>::new())));
        assert_eq!(statement.clause_count(), 1);
        assert_eq!(statement.compile().unwrap().script, "MATCH (n)");
    }

    #[rstest]
    fn test_nested_statement_merge() {
        let mut inner = Statement::new();
        inner.attach(Where::new(&Condition::map([("x", 1)])));

        let mut outer = Statement::new();
        outer.attach(Where::new(&Condition::map([("x", 2)])));
        outer.attach(inner);

        let compiled = outer.compile().unwrap();
        assert_eq!(compiled.script, "WHERE x = $x\nWHERE x = $x2");
        assert_eq!(compiled.params["x"], json!(2));
        assert_eq!(compiled.params["x2"], json!(1));
    }
}
