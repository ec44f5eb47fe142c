//! Condition trees and their precedence-aware rendering.
//!
//! A condition is a tree of boolean combinators over comparisons:
//!
//! - a mapping is an implicit `AND` whose keys extend the field path,
//! - a list is an implicit `OR` over conditions on the same field,
//! - a scalar is an equality test against a new parameter,
//! - a [`Comparator`] renders itself.
//!
//! Parentheses are only inserted where operator precedence requires them.
//!
//! ```
//! use cypher_builder::builder::conditions::{compile_conditions, Condition};
//!
//! let condition = Condition::map([
//!     ("name", Condition::from("Alice")),
//!     ("age", Condition::list([30, 31])),
//! ]);
//! let compiled = compile_conditions(&condition).unwrap();
//! assert_eq!(compiled.script, "name = $name AND (age = $age OR age = $age2)");
//! ```

use serde_json::Value;

use super::comparators::{param_name_for, Compare, Comparator};
use super::fragment::{FinalizeError, Fragment};
use super::params::ParameterTable;
use super::CompiledQuery;

/// Binding strength of boolean operators, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Precedence {
    #[default]
    None,
    Or,
    Xor,
    And,
    Not,
}

/// A condition tree.
#[derive(Debug, Clone)]
pub enum Condition {
    /// Equality against a parameter holding the value.
    Scalar(Value),
    /// Pre-compiled leaf.
    Comparator(Comparator),
    /// Implicit `OR`; every element applies to the same field.
    List(Vec<Condition>),
    /// Implicit `AND`; keys are appended to the field path.
    Map(Vec<(String, Condition)>),
    And(Vec<(String, Condition)>),
    Or(Vec<Condition>),
    Xor(Vec<Condition>),
    Not(Box<Condition>),
}

fn collect_pairs<K, C, I>(pairs: I) -> Vec<(String, Condition)>
where
    K: Into<String>,
    C: Into<Condition>,
    I: IntoIterator<Item = (K, C)>,
{
    pairs
        .into_iter()
        .map(|(k, c)| (k.into(), c.into()))
        .collect()
}

fn collect_items<C, I>(items: I) -> Vec<Condition>
where
    C: Into<Condition>,
    I: IntoIterator<Item = C>,
{
    items.into_iter().map(Into::into).collect()
}

impl Condition {
    pub fn scalar(value: impl Into<Value>) -> Self {
        Condition::Scalar(value.into())
    }

    pub fn map<K, C, I>(pairs: I) -> Self
    where
        K: Into<String>,
        C: Into<Condition>,
        I: IntoIterator<Item = (K, C)>,
    {
        Condition::Map(collect_pairs(pairs))
    }

    pub fn list<C, I>(items: I) -> Self
    where
        C: Into<Condition>,
        I: IntoIterator<Item = C>,
    {
        Condition::List(collect_items(items))
    }

    pub fn and<K, C, I>(pairs: I) -> Self
    where
        K: Into<String>,
        C: Into<Condition>,
        I: IntoIterator<Item = (K, C)>,
    {
        Condition::And(collect_pairs(pairs))
    }

    pub fn or<C, I>(items: I) -> Self
    where
        C: Into<Condition>,
        I: IntoIterator<Item = C>,
    {
        Condition::Or(collect_items(items))
    }

    pub fn xor<C, I>(items: I) -> Self
    where
        C: Into<Condition>,
        I: IntoIterator<Item = C>,
    {
        Condition::Xor(collect_items(items))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: impl Into<Condition>) -> Self {
        Condition::Not(Box::new(inner.into()))
    }

    /// Whether the tree contains no leaf, so it renders as nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            Condition::Scalar(_) | Condition::Comparator(_) => false,
            Condition::List(items) | Condition::Or(items) | Condition::Xor(items) => {
                items.iter().all(Condition::is_empty)
            }
            Condition::Map(pairs) | Condition::And(pairs) => {
                pairs.iter().all(|(_, c)| c.is_empty())
            }
            Condition::Not(inner) => inner.is_empty(),
        }
    }
}

impl From<Comparator> for Condition {
    fn from(c: Comparator) -> Self {
        Condition::Comparator(c)
    }
}

macro_rules! scalar_from {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for Condition {
                fn from(v: $t) -> Self {
                    Condition::Scalar(v.into())
                }
            }
        )*
    };
}

scalar_from!(&str, String, bool, i32, i64, u32, u64, f64);

/// An empty key keeps the prefix, so several conditions can target one field.
fn join_field(prefix: &str, key: &str) -> String {
    if key.is_empty() {
        prefix.to_string()
    } else if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

/// Indices of the children that render to something.
fn live_children<'a, I>(children: I) -> Vec<usize>
where
    I: IntoIterator<Item = &'a Condition>,
{
    children
        .into_iter()
        .enumerate()
        .filter(|(_, c)| !c.is_empty())
        .map(|(i, _)| i)
        .collect()
}

/// Render the `live` children of a group joined by `separator`.
///
/// Groups of fewer than two live children render at the inherited
/// precedence, so they never add brackets.
fn render_group<F>(
    table: &mut ParameterTable,
    live: &[usize],
    inherited: Precedence,
    own: Precedence,
    separator: &str,
    mut render_child: F,
) -> Fragment
where
    F: FnMut(&mut ParameterTable, usize, Precedence) -> Fragment,
{
    let child_precedence = if live.len() < 2 { inherited } else { own };
    let parts: Vec<Fragment> = live
        .iter()
        .map(|&i| render_child(table, i, child_precedence))
        .filter(|f| !f.is_empty())
        .collect();

    let needs_brackets = parts.len() >= 2 && inherited > own;
    let joined = Fragment::join(parts, separator);
    if needs_brackets {
        joined.parenthesized()
    } else {
        joined
    }
}

/// Render `condition` for `field` under the precedence of its parent.
///
/// Recursion depth equals the nesting depth of the tree; untrusted input should
/// go through [`Condition::from_json_with_limit`], which bounds it.
pub fn render(
    table: &mut ParameterTable,
    condition: &Condition,
    precedence: Precedence,
    field: &str,
) -> Fragment {
    match condition {
        Condition::Comparator(comparator) => comparator.compile(table, field),
        Condition::Scalar(value) => {
            let id = table.allocate(value.clone(), Some(param_name_for(field)));
            let mut fragment = Fragment::text(format!("{} = ", field));
            fragment.push_param(id);
            fragment
        }
        Condition::Map(pairs) | Condition::And(pairs) => render_group(
            table,
            &live_children(pairs.iter().map(|(_, c)| c)),
            precedence,
            Precedence::And,
            " AND ",
            |table, i, child| {
                let (key, value) = &pairs[i];
                render(table, value, child, &join_field(field, key))
            },
        ),
        Condition::List(items) | Condition::Or(items) => render_group(
            table,
            &live_children(items),
            precedence,
            Precedence::Or,
            " OR ",
            |table, i, child| render(table, &items[i], child, field),
        ),
        Condition::Xor(items) => render_group(
            table,
            &live_children(items),
            precedence,
            Precedence::Xor,
            " XOR ",
            |table, i, child| render(table, &items[i], child, field),
        ),
        Condition::Not(inner) => {
            let operand = render(table, inner, Precedence::Not, field);
            if operand.is_empty() {
                return operand;
            }
            let mut fragment = Fragment::text("NOT ");
            fragment.append(operand);
            if precedence > Precedence::Not {
                fragment.parenthesized()
            } else {
                fragment
            }
        }
    }
}

/// Render a top-level condition with no field prefix.
pub fn render_conditions(table: &mut ParameterTable, condition: &Condition) -> Fragment {
    render(table, condition, Precedence::None, "")
}

/// Render a condition into its own table and finalize it.
pub fn compile_conditions(condition: &Condition) -> Result<CompiledQuery, FinalizeError> {
    let mut table = ParameterTable::new();
    let fragment = render_conditions(&mut table, condition);
    Ok(CompiledQuery {
        script: fragment.finalize(&table)?,
        params: table.values_by_name(),
    })
}
