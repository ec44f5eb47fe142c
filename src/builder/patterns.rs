//! Node and relation pattern literals.
//!
//! Renders:
//! - **Node**: `(name:Label1:Label2 { key: $key })`
//! - **Relation**: `-[name:TYPE1|TYPE2*1..3 { key: $key }]->`
//!
//! Each pattern owns a parameter table for its property conditions; clauses
//! merge it into their own when the pattern is attached.

use serde_json::{Map, Value};
use thiserror::Error;

use super::fragment::Fragment;
use super::params::ParameterTable;
use super::pattern_conditions::{ConditionMode, PatternConditions};
use super::Clause;
use crate::escape::{is_identifier, quote_identifier};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("Invalid pattern name: {reason}")]
    InvalidName { reason: String },

    #[error("Invalid pattern labels: {reason}")]
    InvalidLabels { reason: String },

    #[error("Invalid pattern conditions: {reason}")]
    InvalidConditions { reason: String },
}

/// Validated name, labels and property conditions of a pattern.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatternArgs {
    pub name: String,
    pub labels: Vec<String>,
    pub conditions: Map<String, Value>,
}

fn is_nil(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

impl PatternArgs {
    pub fn new<L, I>(name: impl Into<String>, labels: I, conditions: Map<String, Value>) -> Result<Self, PatternError>
    where
        L: Into<String>,
        I: IntoIterator<Item = L>,
    {
        let args = Self {
            name: name.into(),
            labels: labels.into_iter().map(Into::into).collect(),
            conditions,
        };
        args.validate()?;
        Ok(args)
    }

    /// Interpret loosely typed pattern arguments.
    ///
    /// Arguments may be omitted from the right and shift left: a lone array
    /// is taken as labels, a lone object as conditions, and an object in the
    /// labels position as conditions.
    ///
    /// ```
    /// use cypher_builder::builder::patterns::PatternArgs;
    /// use serde_json::json;
    ///
    /// let args = PatternArgs::parse(Some(&json!(["Person"])), None, None).unwrap();
    /// assert_eq!(args.name, "");
    /// assert_eq!(args.labels, vec!["Person"]);
    ///
    /// let args = PatternArgs::parse(Some(&json!("n")), Some(&json!({"age": 3})), None).unwrap();
    /// assert_eq!(args.conditions["age"], json!(3));
    /// ```
    pub fn parse(
        name: Option<&Value>,
        labels: Option<&Value>,
        conditions: Option<&Value>,
    ) -> Result<Self, PatternError> {
        let (mut name, mut labels, mut conditions) = (name, labels, conditions);

        if is_nil(conditions) {
            if matches!(labels, Some(Value::Object(_))) {
                conditions = labels.take();
            } else if is_nil(labels) && matches!(name, Some(Value::Object(_))) {
                conditions = name.take();
            } else {
                conditions = None;
            }
        }

        if is_nil(labels) && matches!(name, Some(Value::Array(_))) {
            labels = name.take();
        }

        let name = match name {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                return Err(PatternError::InvalidName {
                    reason: format!("name must be a string, got {}", json_type(other)),
                })
            }
        };

        let labels = match labels {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::String(s)) => vec![s.clone()],
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(PatternError::InvalidLabels {
                        reason: format!("labels must be strings, got {}", json_type(other)),
                    }),
                })
                .collect::<Result<Vec<String>, PatternError>>()?,
            Some(other) => {
                return Err(PatternError::InvalidLabels {
                    reason: format!("labels must be a string or an array, got {}", json_type(other)),
                })
            }
        };

        let conditions = match conditions {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(other) => {
                return Err(PatternError::InvalidConditions {
                    reason: format!("conditions must be an object, got {}", json_type(other)),
                })
            }
        };

        let args = Self {
            name,
            labels,
            conditions,
        };
        args.validate()?;
        Ok(args)
    }

    fn validate(&self) -> Result<(), PatternError> {
        if !self.name.is_empty() && !is_identifier(&self.name) {
            return Err(PatternError::InvalidName {
                reason: format!("'{}' is not a valid variable name", self.name),
            });
        }
        if self.labels.iter().any(String::is_empty) {
            return Err(PatternError::InvalidLabels {
                reason: "labels cannot be empty strings".to_string(),
            });
        }
        Ok(())
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// State shared by node and relation patterns.
#[derive(Debug, Clone)]
struct PatternCore {
    name: String,
    labels: Vec<String>,
    conditions: PatternConditions,
    table: ParameterTable,
}

impl PatternCore {
    fn new(args: PatternArgs) -> Self {
        let mut table = ParameterTable::new();
        let conditions =
            PatternConditions::bind(&mut table, args.conditions, ConditionMode::Expanded);
        Self {
            name: args.name,
            labels: args.labels,
            conditions,
            table,
        }
    }

    fn set_condition_mode(&mut self, mode: ConditionMode) {
        self.conditions.set_mode(&mut self.table, mode);
    }

    /// `name:Labels* conditions`, trimmed.
    fn inner(&self, label_separator: &str, length: &str) -> Fragment {
        let mut head = self.name.clone();
        if !self.labels.is_empty() {
            let labels: Vec<_> = self.labels.iter().map(|l| quote_identifier(l)).collect();
            head.push(':');
            head.push_str(&labels.join(label_separator));
        }
        head.push_str(length);

        let conditions = self.conditions.render();
        let mut fragment = Fragment::text(head.as_str());
        if !conditions.is_empty() {
            if !head.is_empty() {
                fragment.push_str(" ");
            }
            fragment.append(conditions);
        }
        fragment
    }
}

/// `(name:Label { ... })`
#[derive(Debug, Clone)]
pub struct NodePattern {
    core: PatternCore,
}

impl NodePattern {
    pub fn new(args: PatternArgs) -> Self {
        Self {
            core: PatternCore::new(args),
        }
    }

    pub fn name(&self) -> &str {
        &self.core.name
    }

    pub fn labels(&self) -> &[String] {
        &self.core.labels
    }

    pub fn condition_mode(&self) -> ConditionMode {
        self.core.conditions.mode()
    }

    pub fn set_condition_mode(&mut self, mode: ConditionMode) {
        self.core.set_condition_mode(mode);
    }
}

impl Clause for NodePattern {
    fn build(&self) -> Fragment {
        let mut fragment = Fragment::text("(");
        fragment.append(self.core.inner(":", ""));
        fragment.push_str(")");
        fragment
    }

    fn parameters(&self) -> &ParameterTable {
        &self.core.table
    }

    fn into_parameters(self) -> ParameterTable {
        self.core.table
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    In,
    #[default]
    Out,
    Either,
}

impl Direction {
    fn arrows(&self) -> (&'static str, &'static str) {
        match self {
            Direction::In => ("<-", "-"),
            Direction::Out => ("-", "->"),
            Direction::Either => ("-", "-"),
        }
    }
}

/// Variable length of a relation pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathLength {
    /// `*`
    Any,
    /// `*n`
    Exact(u32),
    /// `*min..max`, either bound optional
    Range(Option<u32>, Option<u32>),
}

impl PathLength {
    fn render(&self) -> String {
        match self {
            PathLength::Any => "*".to_string(),
            PathLength::Exact(n) => format!("*{}", n),
            PathLength::Range(min, max) => {
                let bound = |b: &Option<u32>| b.map(|n| n.to_string()).unwrap_or_default();
                format!("*{}..{}", bound(min), bound(max))
            }
        }
    }
}

/// `-[name:TYPE { ... }]->`
#[derive(Debug, Clone)]
pub struct RelationPattern {
    core: PatternCore,
    direction: Direction,
    length: Option<PathLength>,
}

impl RelationPattern {
    pub fn new(direction: Direction, args: PatternArgs) -> Self {
        Self {
            core: PatternCore::new(args),
            direction,
            length: None,
        }
    }

    pub fn with_length(mut self, length: PathLength) -> Self {
        self.length = Some(length);
        self
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn condition_mode(&self) -> ConditionMode {
        self.core.conditions.mode()
    }

    pub fn set_condition_mode(&mut self, mode: ConditionMode) {
        self.core.set_condition_mode(mode);
    }
}

impl Clause for RelationPattern {
    fn build(&self) -> Fragment {
        let (open, close) = self.direction.arrows();
        let length = self.length.map(|l| l.render()).unwrap_or_default();
        let inner = self.core.inner("|", &length);

        let mut fragment = Fragment::text(open);
        if !inner.is_empty() {
            fragment.push_str("[");
            fragment.append(inner);
            fragment.push_str("]");
        }
        fragment.push_str(close);
        fragment
    }

    fn parameters(&self) -> &ParameterTable {
        &self.core.table
    }

    fn into_parameters(self) -> ParameterTable {
        self.core.table
    }
}

/// One element of a path.
#[derive(Debug, Clone)]
pub enum Pattern {
    Node(NodePattern),
    Relation(RelationPattern),
}

impl Pattern {
    pub fn set_condition_mode(&mut self, mode: ConditionMode) {
        match self {
            Pattern::Node(p) => p.set_condition_mode(mode),
            Pattern::Relation(p) => p.set_condition_mode(mode),
        }
    }
}

impl Clause for Pattern {
    fn build(&self) -> Fragment {
        match self {
            Pattern::Node(p) => p.build(),
            Pattern::Relation(p) => p.build(),
        }
    }

    fn parameters(&self) -> &ParameterTable {
        match self {
            Pattern::Node(p) => p.parameters(),
            Pattern::Relation(p) => p.parameters(),
        }
    }

    fn into_parameters(self) -> ParameterTable {
        match self {
            Pattern::Node(p) => p.into_parameters(),
            Pattern::Relation(p) => p.into_parameters(),
        }
    }
}

impl From<NodePattern> for Pattern {
    fn from(p: NodePattern) -> Self {
        Pattern::Node(p)
    }
}

impl From<RelationPattern> for Pattern {
    fn from(p: RelationPattern) -> Self {
        Pattern::Relation(p)
    }
}

/// Build a node pattern from loosely typed arguments.
pub fn node(
    name: Option<&Value>,
    labels: Option<&Value>,
    conditions: Option<&Value>,
) -> Result<NodePattern, PatternError> {
    Ok(NodePattern::new(PatternArgs::parse(name, labels, conditions)?))
}

/// Build a relation pattern from loosely typed arguments.
pub fn relation(
    direction: Direction,
    name: Option<&Value>,
    labels: Option<&Value>,
    conditions: Option<&Value>,
) -> Result<RelationPattern, PatternError> {
    Ok(RelationPattern::new(direction, PatternArgs::parse(name, labels, conditions)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn render<C: Clause>(pattern: &C) -> String {
        pattern.build().finalize(pattern.parameters()).unwrap()
    }

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[rstest]
    fn test_parse_name_only() {
        let parsed = PatternArgs::parse(Some(&json!("n")), None, None).unwrap();
        assert_eq!(parsed, PatternArgs { name: "n".into(), ..Default::default() });
    }

    #[rstest]
    fn test_parse_labels_in_name_position() {
        let parsed = PatternArgs::parse(Some(&json!(["A", "B"])), None, None).unwrap();
        assert_eq!(parsed.name, "");
        assert_eq!(parsed.labels, vec!["A", "B"]);
    }

    #[rstest]
    fn test_parse_conditions_in_name_position() {
        let parsed = PatternArgs::parse(Some(&json!({"a": 1})), None, None).unwrap();
        assert_eq!(parsed.name, "");
        assert!(parsed.labels.is_empty());
        assert_eq!(parsed.conditions, args(json!({"a": 1})));
    }

    #[rstest]
    fn test_parse_conditions_in_labels_position() {
        let parsed = PatternArgs::parse(Some(&json!("n")), Some(&json!({"a": 1})), None).unwrap();
        assert_eq!(parsed.name, "n");
        assert!(parsed.labels.is_empty());
        assert_eq!(parsed.conditions, args(json!({"a": 1})));
    }

    #[rstest]
    fn test_parse_all_positions() {
        let parsed = PatternArgs::parse(
            Some(&json!("n")),
            Some(&json!("Person")),
            Some(&json!({"a": 1})),
        )
        .unwrap();
        assert_eq!(parsed.labels, vec!["Person"]);
        assert_eq!(parsed.conditions.len(), 1);
    }

    #[rstest]
    fn test_parse_rejects_array_name_with_labels() {
        let err = PatternArgs::parse(Some(&json!(["A"])), Some(&json!(["B"])), None).unwrap_err();
        assert!(matches!(err, PatternError::InvalidName { .. }));
    }

    #[rstest]
    #[case(Some(json!(3)), None, None)]
    #[case(Some(json!("has space")), None, None)]
    fn test_parse_invalid_name(
        #[case] name: Option<Value>,
        #[case] labels: Option<Value>,
        #[case] conditions: Option<Value>,
    ) {
        let err = PatternArgs::parse(name.as_ref(), labels.as_ref(), conditions.as_ref()).unwrap_err();
        assert!(matches!(err, PatternError::InvalidName { .. }));
    }

    #[rstest]
    fn test_parse_invalid_labels() {
        let err = PatternArgs::parse(Some(&json!("n")), Some(&json!(5)), None).unwrap_err();
        assert!(matches!(err, PatternError::InvalidLabels { .. }));
        let err = PatternArgs::parse(Some(&json!("n")), Some(&json!(["A", 1])), None).unwrap_err();
        assert!(matches!(err, PatternError::InvalidLabels { .. }));
    }

    #[rstest]
    fn test_parse_invalid_conditions() {
        let err = PatternArgs::parse(Some(&json!("n")), Some(&json!("A")), Some(&json!([1])))
            .unwrap_err();
        assert_eq!(
            err,
            PatternError::InvalidConditions {
                reason: "conditions must be an object, got array".to_string()
            }
        );
    }

    #[rstest]
    fn test_node_rendering() {
        let empty = node(None, None, None).unwrap();
        assert_eq!(render(&empty), "()");

        let named = node(Some(&json!("n")), Some(&json!(["Person", "Admin"])), None).unwrap();
        assert_eq!(render(&named), "(n:Person:Admin)");

        let full = node(Some(&json!("n")), Some(&json!("Person")), Some(&json!({"name": "A", "age": 3}))).unwrap();
        assert_eq!(render(&full), "(n:Person { name: $name, age: $age })");

        let anonymous = node(Some(&json!({"name": "A"})), None, None).unwrap();
        assert_eq!(render(&anonymous), "({ name: $name })");
    }

    #[rstest]
    fn test_node_condensed_conditions() {
        let mut pattern = node(Some(&json!("n")), Some(&json!({"name": "A", "age": 3})), None).unwrap();
        pattern.set_condition_mode(ConditionMode::Condensed);
        assert_eq!(render(&pattern), "(n $conditions)");
        assert_eq!(pattern.parameters().len(), 1);

        pattern.set_condition_mode(ConditionMode::Expanded);
        assert_eq!(render(&pattern), "(n { name: $name, age: $age })");
        assert_eq!(pattern.parameters().len(), 2);
    }

    #[rstest]
    fn test_node_quotes_labels() {
        let pattern = node(Some(&json!("n")), Some(&json!("Big Person")), None).unwrap();
        assert_eq!(render(&pattern), "(n:`Big Person`)");
    }

    #[rstest]
    #[case(Direction::Out, "-->")]
    #[case(Direction::In, "<--")]
    #[case(Direction::Either, "--")]
    fn test_empty_relation_arrows(#[case] direction: Direction, #[case] expected: &str) {
        let pattern = relation(direction, None, None, None).unwrap();
        assert_eq!(render(&pattern), expected);
    }

    #[rstest]
    fn test_relation_rendering() {
        let pattern = relation(
            Direction::Out,
            Some(&json!("r")),
            Some(&json!(["KNOWS", "LIKES"])),
            Some(&json!({"since": 2020})),
        )
        .unwrap();
        assert_eq!(render(&pattern), "-[r:KNOWS|LIKES { since: $since }]->");
    }

    #[rstest]
    #[case(PathLength::Any, "-[*]->")]
    #[case(PathLength::Exact(2), "-[*2]->")]
    #[case(PathLength::Range(Some(1), Some(3)), "-[*1..3]->")]
    #[case(PathLength::Range(Some(2), None), "-[*2..]->")]
    #[case(PathLength::Range(None, Some(4)), "-[*..4]->")]
    fn test_relation_lengths(#[case] length: PathLength, #[case] expected: &str) {
        let pattern = relation(Direction::Out, None, None, None)
            .unwrap()
            .with_length(length);
        assert_eq!(render(&pattern), expected);
    }

    #[rstest]
    fn test_relation_name_and_length() {
        let pattern = relation(Direction::In, Some(&json!("r")), Some(&json!("KNOWS")), None)
            .unwrap()
            .with_length(PathLength::Range(Some(1), Some(2)));
        assert_eq!(render(&pattern), "<-[r:KNOWS*1..2]-");
    }

    #[rstest]
    fn test_args_new_validates() {
        assert!(PatternArgs::new("n", ["Person"], Map::new()).is_ok());
        assert!(matches!(
            PatternArgs::new("1n", Vec::<String>::new(), Map::new()),
            Err(PatternError::InvalidName { .. })
        ));
        assert!(matches!(
            PatternArgs::new("n", [""], Map::new()),
            Err(PatternError::InvalidLabels { .. })
        ));
    }
}
