//! Comparator library.
//!
//! A comparator is a pre-compiled condition leaf: given the parameter table and
//! the field it applies to, it allocates whatever parameters it needs and
//! returns the rendered comparison.
//!
//! ```
//! use cypher_builder::builder::comparators::{between, greater_than};
//! use cypher_builder::builder::comparators::Compare;
//! use cypher_builder::builder::params::ParameterTable;
//!
//! let mut table = ParameterTable::new();
//! let fragment = between(18, 65).compile(&mut table, "age");
//! assert_eq!(
//!     fragment.finalize(&table).unwrap(),
//!     "age >= $lowerAge AND age <= $upperAge"
//! );
//!
//! let fragment = greater_than("n.minimum").use_field_reference().compile(&mut table, "n.score");
//! assert_eq!(fragment.finalize(&table).unwrap(), "n.score > n.minimum");
//! ```

use std::fmt;
use std::sync::Arc;

use enum_dispatch::enum_dispatch;
use serde_json::Value;

use super::fragment::Fragment;
use super::params::ParameterTable;

/// Render a condition leaf against a field.
#[enum_dispatch]
pub trait Compare {
    /// Allocate parameters in `table` and render the comparison for `field`.
    fn compile(&self, table: &mut ParameterTable, field: &str) -> Fragment;
}

/// Any comparator that can appear as a condition leaf.
#[enum_dispatch(Compare)]
#[derive(Debug, Clone)]
pub enum Comparator {
    Binary(BinaryComparator),
    Between(Between),
    HasLabel(HasLabel),
    Exists(Exists),
    IsNull(IsNull),
    Custom(CustomComparator),
}

impl Comparator {
    /// Render the operand(s) as a literal reference to another field or
    /// variable instead of allocating a parameter.
    ///
    /// Comparators without operands are returned unchanged.
    pub fn use_field_reference(self) -> Self {
        match self {
            Comparator::Binary(mut c) => {
                c.operand.field_reference = true;
                Comparator::Binary(c)
            }
            Comparator::Between(mut c) => {
                c.lower.field_reference = true;
                c.upper.field_reference = true;
                Comparator::Between(c)
            }
            other => other,
        }
    }
}

/// Last `.`-separated segment of a field path, used as the parameter name.
pub(crate) fn param_name_for(field: &str) -> &str {
    field.rsplit('.').next().unwrap_or(field)
}

/// Comparison operators with a parameter or reference on the right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equals,
    GreaterThan,
    GreaterEqualTo,
    LessThan,
    LessEqualTo,
    StartsWith,
    EndsWith,
    Contains,
    In,
    Regexp,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Equals => "=",
            Operator::GreaterThan => ">",
            Operator::GreaterEqualTo => ">=",
            Operator::LessThan => "<",
            Operator::LessEqualTo => "<=",
            Operator::StartsWith => "STARTS WITH",
            Operator::EndsWith => "ENDS WITH",
            Operator::Contains => "CONTAINS",
            Operator::In => "IN",
            Operator::Regexp => "=~",
        }
    }
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Operand {
    pub value: Value,
    pub field_reference: bool,
}

impl Operand {
    fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            field_reference: false,
        }
    }

    fn render(&self, table: &mut ParameterTable, param_name: &str) -> Fragment {
        if self.field_reference {
            match &self.value {
                Value::String(reference) => Fragment::text(reference.as_str()),
                other => Fragment::text(other.to_string()),
            }
        } else {
            Fragment::param(table.allocate(self.value.clone(), Some(param_name)))
        }
    }
}

/// `<field> <op> <operand>`
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryComparator {
    pub operator: Operator,
    pub operand: Operand,
}

impl Compare for BinaryComparator {
    fn compile(&self, table: &mut ParameterTable, field: &str) -> Fragment {
        let mut fragment = Fragment::text(format!("{} {} ", field, self.operator.symbol()));
        fragment.append(self.operand.render(table, param_name_for(field)));
        fragment
    }
}

/// `<field> >= <lower> AND <field> <= <upper>` with configurable inclusivity.
#[derive(Debug, Clone, PartialEq)]
pub struct Between {
    pub lower: Operand,
    pub upper: Operand,
    pub lower_inclusive: bool,
    pub upper_inclusive: bool,
}

impl Compare for Between {
    fn compile(&self, table: &mut ParameterTable, field: &str) -> Fragment {
        let name = param_name_for(field);
        let lower_op = if self.lower_inclusive { ">=" } else { ">" };
        let upper_op = if self.upper_inclusive { "<=" } else { "<" };

        let mut fragment = Fragment::text(format!("{} {} ", field, lower_op));
        fragment.append(self.lower.render(table, &format!("lower_{}", name)));
        fragment.push_str(format!(" AND {} {} ", field, upper_op));
        fragment.append(self.upper.render(table, &format!("upper_{}", name)));
        fragment
    }
}

/// `<field>:<label>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HasLabel {
    pub label: String,
}

impl Compare for HasLabel {
    fn compile(&self, _table: &mut ParameterTable, field: &str) -> Fragment {
        Fragment::text(format!("{}:{}", field, self.label))
    }
}

/// `exists(<field>)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exists;

impl Compare for Exists {
    fn compile(&self, _table: &mut ParameterTable, field: &str) -> Fragment {
        Fragment::text(format!("exists({})", field))
    }
}

/// `<field> IS NULL`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsNull;

impl Compare for IsNull {
    fn compile(&self, _table: &mut ParameterTable, field: &str) -> Fragment {
        Fragment::text(format!("{} IS NULL", field))
    }
}

type CompileFn = dyn Fn(&mut ParameterTable, &str) -> Fragment + Send + Sync;

/// Caller-supplied comparator function.
#[derive(Clone)]
pub struct CustomComparator(Arc<CompileFn>);

impl Compare for CustomComparator {
    fn compile(&self, table: &mut ParameterTable, field: &str) -> Fragment {
        (self.0)(table, field)
    }
}

impl fmt::Debug for CustomComparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomComparator(..)")
    }
}

fn binary(operator: Operator, value: impl Into<Value>) -> Comparator {
    Comparator::Binary(BinaryComparator {
        operator,
        operand: Operand::new(value),
    })
}

pub fn equals(value: impl Into<Value>) -> Comparator {
    binary(Operator::Equals, value)
}

pub fn greater_than(value: impl Into<Value>) -> Comparator {
    binary(Operator::GreaterThan, value)
}

pub fn greater_equal_to(value: impl Into<Value>) -> Comparator {
    binary(Operator::GreaterEqualTo, value)
}

pub fn less_than(value: impl Into<Value>) -> Comparator {
    binary(Operator::LessThan, value)
}

pub fn less_equal_to(value: impl Into<Value>) -> Comparator {
    binary(Operator::LessEqualTo, value)
}

pub fn starts_with(value: impl Into<Value>) -> Comparator {
    binary(Operator::StartsWith, value)
}

pub fn ends_with(value: impl Into<Value>) -> Comparator {
    binary(Operator::EndsWith, value)
}

pub fn contains(value: impl Into<Value>) -> Comparator {
    binary(Operator::Contains, value)
}

pub fn in_array(values: impl Into<Value>) -> Comparator {
    binary(Operator::In, values)
}

/// Regular expression match. `insensitive` prefixes the pattern with `(?i)`.
pub fn regexp(pattern: &str, insensitive: bool) -> Comparator {
    let pattern = if insensitive {
        format!("(?i){}", pattern)
    } else {
        pattern.to_string()
    };
    binary(Operator::Regexp, pattern)
}

/// Inclusive range check.
pub fn between(lower: impl Into<Value>, upper: impl Into<Value>) -> Comparator {
    between_with(lower, upper, true, true)
}

/// Range check with explicit inclusivity on each bound.
pub fn between_with(
    lower: impl Into<Value>,
    upper: impl Into<Value>,
    lower_inclusive: bool,
    upper_inclusive: bool,
) -> Comparator {
    Comparator::Between(Between {
        lower: Operand::new(lower),
        upper: Operand::new(upper),
        lower_inclusive,
        upper_inclusive,
    })
}

pub fn has_label(label: impl Into<String>) -> Comparator {
    Comparator::HasLabel(HasLabel {
        label: label.into(),
    })
}

pub fn exists() -> Comparator {
    Comparator::Exists(Exists)
}

pub fn is_null() -> Comparator {
    Comparator::IsNull(IsNull)
}

/// Wrap a function as a comparator. It is responsible for its own parameter
/// allocation and field referencing.
pub fn custom<F>(f: F) -> Comparator
where
    F: Fn(&mut ParameterTable, &str) -> Fragment + Send + Sync + 'static,
{
    Comparator::Custom(CustomComparator(Arc::new(f)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn table() -> ParameterTable {
        ParameterTable::new()
    }

    fn render(comparator: Comparator, table: &mut ParameterTable, field: &str) -> String {
        comparator.compile(table, field).finalize(table).unwrap()
    }

    #[rstest]
    #[case(equals(1), "age = $age")]
    #[case(greater_than(1), "age > $age")]
    #[case(greater_equal_to(1), "age >= $age")]
    #[case(less_than(1), "age < $age")]
    #[case(less_equal_to(1), "age <= $age")]
    #[case(starts_with("a"), "age STARTS WITH $age")]
    #[case(ends_with("a"), "age ENDS WITH $age")]
    #[case(contains("a"), "age CONTAINS $age")]
    #[case(in_array(json!([1, 2])), "age IN $age")]
    #[case(regexp("a.*", false), "age =~ $age")]
    fn test_binary_comparators(
        mut table: ParameterTable,
        #[case] comparator: Comparator,
        #[case] expected: &str,
    ) {
        assert_eq!(render(comparator, &mut table, "age"), expected);
        assert_eq!(table.len(), 1);
    }

    #[rstest]
    fn test_param_named_after_last_segment(mut table: ParameterTable) {
        assert_eq!(render(equals("x"), &mut table, "n.user.name"), "n.user.name = $name");
        assert_eq!(table.values_by_name()["name"], json!("x"));
    }

    #[rstest]
    fn test_field_reference_skips_allocation(mut table: ParameterTable) {
        let comparator = less_than("other.age").use_field_reference();
        assert_eq!(render(comparator, &mut table, "n.age"), "n.age < other.age");
        assert!(table.is_empty());
    }

    #[rstest]
    fn test_regexp_insensitive_prefix(mut table: ParameterTable) {
        render(regexp("^bob", true), &mut table, "name");
        assert_eq!(table.values_by_name()["name"], json!("(?i)^bob"));
    }

    #[rstest]
    fn test_between_inclusive(mut table: ParameterTable) {
        assert_eq!(
            render(between(18, 65), &mut table, "age"),
            "age >= $lowerAge AND age <= $upperAge"
        );
        let params = table.values_by_name();
        assert_eq!(params["lowerAge"], json!(18));
        assert_eq!(params["upperAge"], json!(65));
    }

    #[rstest]
    fn test_between_exclusive(mut table: ParameterTable) {
        assert_eq!(
            render(between_with(1, 5, false, false), &mut table, "n.rank"),
            "n.rank > $lowerRank AND n.rank < $upperRank"
        );
    }

    #[rstest]
    fn test_between_mixed_inclusivity(mut table: ParameterTable) {
        assert_eq!(
            render(between_with(1, 5, true, false), &mut table, "x"),
            "x >= $lowerX AND x < $upperX"
        );
    }

    #[rstest]
    fn test_between_field_reference(mut table: ParameterTable) {
        let comparator = between("n.min", "n.max").use_field_reference();
        assert_eq!(render(comparator, &mut table, "m.v"), "m.v >= n.min AND m.v <= n.max");
        assert!(table.is_empty());
    }

    #[rstest]
    fn test_parameterless_comparators(mut table: ParameterTable) {
        assert_eq!(render(has_label("Person"), &mut table, "n"), "n:Person");
        assert_eq!(render(exists(), &mut table, "n.email"), "exists(n.email)");
        assert_eq!(render(is_null(), &mut table, "n.email"), "n.email IS NULL");
        assert!(table.is_empty());
    }

    #[rstest]
    fn test_custom_comparator(mut table: ParameterTable) {
        let comparator = custom(|table, field| {
            let id = table.allocate(3, Some("size"));
            let mut fragment = Fragment::text(format!("size({}) > ", field));
            fragment.push_param(id);
            fragment
        });
        assert_eq!(render(comparator, &mut table, "n.tags"), "size(n.tags) > $size");
    }

    #[rstest]
    fn test_repeated_comparators_get_unique_names(mut table: ParameterTable) {
        let first = render(equals(1), &mut table, "age");
        let second = render(equals(2), &mut table, "age");
        assert_eq!(first, "age = $age");
        assert_eq!(second, "age = $age2");
    }
}
