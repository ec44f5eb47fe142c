//! Parameter table for query building.
//!
//! Every literal value that ends up in a query is stored here under a unique
//! name and referenced from the query text as `$name`. Rendered text refers to
//! parameters through [`ParamId`] handles rather than names, so a parameter can
//! be renamed while merging tables without invalidating anything rendered
//! earlier. Names are resolved once, by [`Fragment::finalize`].
//!
//! [`Fragment::finalize`]: super::fragment::Fragment::finalize

use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, trace};
use serde_json::{Map, Value};

use crate::utils::{unique_string, DEFAULT_STEM};

static NEXT_PARAM_ID: AtomicU64 = AtomicU64::new(1);

/// Process-wide identity of a parameter.
///
/// Handles stay valid across [`ParameterTable::merge`]; only the name behind
/// them may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamId(u64);

impl ParamId {
    fn next() -> Self {
        ParamId(NEXT_PARAM_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A named query parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    id: ParamId,
    name: String,
    value: Value,
}

impl Parameter {
    /// Create a parameter that does not belong to any table yet.
    ///
    /// The name is taken as-is; it is normalised and de-duplicated when the
    /// parameter is adopted by a table.
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            id: ParamId::next(),
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn id(&self) -> ParamId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The `$name` placeholder for the parameter's current name.
    pub fn placeholder(&self) -> String {
        format!("${}", self.name)
    }
}

/// Insertion-ordered set of uniquely named parameters.
///
/// One table belongs to one query (or clause) under construction. Tables are
/// combined with [`merge`](Self::merge), which consumes the source table.
#[derive(Debug, Clone, Default)]
pub struct ParameterTable {
    params: Vec<Parameter>,
}

impl ParameterTable {
    /// Create a new, empty parameter table.
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    fn unique_name(&self, requested: &str) -> String {
        unique_string(requested, self.params.iter().map(|p| p.name.as_str()))
    }

    /// Store `value` under a fresh name derived from `requested`.
    ///
    /// Falls back to `"p"` when no name is requested.
    pub fn allocate(&mut self, value: impl Into<Value>, requested: Option<&str>) -> ParamId {
        let name = self.unique_name(requested.unwrap_or(DEFAULT_STEM));
        let param = Parameter {
            id: ParamId::next(),
            name,
            value: value.into(),
        };
        trace!("allocated parameter ${} ({:?})", param.name, param.id);
        let id = param.id;
        self.params.push(param);
        id
    }

    /// Take ownership of an externally created parameter.
    ///
    /// The parameter keeps its handle. Its name is renamed in place when it
    /// collides with a name already in this table.
    pub fn adopt(&mut self, mut param: Parameter) -> ParamId {
        let name = self.unique_name(&param.name);
        if name != param.name {
            debug!("renamed parameter ${} to ${} on adoption", param.name, name);
            param.name = name;
        }
        let id = param.id;
        self.params.push(param);
        id
    }

    /// Remove the parameter with the given name. No-op if absent.
    pub fn remove(&mut self, name: &str) -> Option<Parameter> {
        let index = self.params.iter().position(|p| p.name == name)?;
        Some(self.params.remove(index))
    }

    /// Remove the parameter behind a handle. No-op if absent.
    pub fn remove_id(&mut self, id: ParamId) -> Option<Parameter> {
        let index = self.params.iter().position(|p| p.id == id)?;
        Some(self.params.remove(index))
    }

    /// Move every parameter of `other` into this table, in its insertion order.
    ///
    /// Handles issued by `other` resolve against this table afterwards.
    pub fn merge(&mut self, other: ParameterTable) {
        debug!(
            "merging {} parameter(s) into table of {}",
            other.params.len(),
            self.params.len()
        );
        for param in other.params {
            self.adopt(param);
        }
    }

    pub fn get(&self, id: ParamId) -> Option<&Parameter> {
        self.params.iter().find(|p| p.id == id)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Current name of the parameter behind `id`.
    pub fn name_of(&self, id: ParamId) -> Option<&str> {
        self.get(id).map(Parameter::name)
    }

    /// Current `$name` placeholder of the parameter behind `id`.
    pub fn placeholder(&self, id: ParamId) -> Option<String> {
        self.get(id).map(Parameter::placeholder)
    }

    pub fn contains(&self, id: ParamId) -> bool {
        self.get(id).is_some()
    }

    /// Parameter names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|p| p.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter()
    }

    /// Snapshot of all parameter values keyed by name, in insertion order.
    pub fn values_by_name(&self) -> Map<String, Value> {
        self.params
            .iter()
            .map(|p| (p.name.clone(), p.value.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use serde_json::json;
    use std::collections::HashSet;

    #[fixture]
    fn table() -> ParameterTable {
        ParameterTable::new()
    }

    #[rstest]
    fn test_table_new_is_empty(table: ParameterTable) {
        assert_eq!(table.len(), 0);
        assert!(table.is_empty());
    }

    #[rstest]
    fn test_allocate_default_name(mut table: ParameterTable) {
        let id = table.allocate(1, None);
        assert_eq!(table.name_of(id), Some("p"));
        assert_eq!(table.placeholder(id).as_deref(), Some("$p"));
    }

    #[rstest]
    fn test_allocate_same_name_twice(mut table: ParameterTable) {
        let a = table.allocate("x", Some("name"));
        let b = table.allocate("y", Some("name"));
        assert_ne!(a, b);
        assert_eq!(table.name_of(a), Some("name"));
        assert_eq!(table.name_of(b), Some("name2"));
    }

    #[rstest]
    fn test_allocate_canonicalises_name(mut table: ParameterTable) {
        let id = table.allocate(1, Some("first_name"));
        assert_eq!(table.name_of(id), Some("firstName"));
    }

    #[rstest]
    fn test_allocate_names_are_unique(mut table: ParameterTable) {
        let requested = ["p", "p2", "p", "p1", "name", "name3", "name", "p", "name1"];
        for name in requested {
            table.allocate(0, Some(name));
        }
        let names: HashSet<&str> = table.names().collect();
        assert_eq!(names.len(), requested.len());
    }

    #[rstest]
    fn test_allocation_is_deterministic() {
        let requested = ["a", "a", "b2", "b", "b", "c10", "c"];
        let run = || {
            let mut table = ParameterTable::new();
            for name in requested {
                table.allocate(0, Some(name));
            }
            table.names().map(str::to_string).collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
        assert_eq!(run(), vec!["a", "a2", "b2", "b3", "b4", "c10", "c11"]);
    }

    #[rstest]
    fn test_values_by_name_preserves_insertion_order(mut table: ParameterTable) {
        table.allocate("z", Some("zeta"));
        table.allocate("a", Some("alpha"));
        let values = table.values_by_name();
        let keys: Vec<&String> = values.keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
        assert_eq!(values["alpha"], json!("a"));
    }

    #[rstest]
    fn test_remove_by_name(mut table: ParameterTable) {
        let id = table.allocate(1, Some("name"));
        let removed = table.remove("name").unwrap();
        assert_eq!(removed.id(), id);
        assert!(table.is_empty());
        assert!(table.remove("name").is_none());
    }

    #[rstest]
    fn test_remove_by_id(mut table: ParameterTable) {
        let id = table.allocate(1, Some("name"));
        assert!(table.remove_id(id).is_some());
        assert!(!table.contains(id));
        assert!(table.remove_id(id).is_none());
    }

    #[rstest]
    fn test_adopt_keeps_free_name(mut table: ParameterTable) {
        let param = Parameter::new("limit", 10);
        let id = param.id();
        assert_eq!(table.adopt(param), id);
        assert_eq!(table.name_of(id), Some("limit"));
    }

    #[rstest]
    fn test_adopt_renames_on_collision(mut table: ParameterTable) {
        table.allocate(1, Some("limit"));
        let param = Parameter::new("limit", 10);
        let id = table.adopt(param);
        assert_eq!(table.name_of(id), Some("limit2"));
        assert_eq!(table.get(id).unwrap().value(), &json!(10));
    }

    #[rstest]
    fn test_merge_renames_colliding_parameters() {
        let mut first = ParameterTable::new();
        let held = first.allocate("a", Some("name"));
        let rendered = first.placeholder(held).unwrap();
        assert_eq!(rendered, "$name");

        let mut second = ParameterTable::new();
        let existing = second.allocate("b", Some("name"));

        second.merge(first);

        assert_eq!(second.name_of(existing), Some("name"));
        let renamed = second.get(held).unwrap();
        assert_eq!(renamed.name(), "name2");
        assert!(second.values_by_name().contains_key(renamed.name()));
        assert_eq!(second.values_by_name()["name2"], json!("a"));
    }

    #[rstest]
    fn test_merge_keeps_first_come_first_served_order() {
        let mut source = ParameterTable::new();
        let a = source.allocate(1, Some("a"));
        let b = source.allocate(2, Some("b"));

        let mut dest = ParameterTable::new();
        let existing = dest.allocate(0, Some("b"));
        dest.merge(source);

        let names: Vec<&str> = dest.names().collect();
        assert_eq!(names, vec!["b", "a", "b2"]);
        assert_eq!(dest.name_of(existing), Some("b"));
        assert_eq!(dest.name_of(a), Some("a"));
        assert_eq!(dest.name_of(b), Some("b2"));
    }

    #[rstest]
    fn test_allocate_after_saturated_suffix(mut table: ParameterTable) {
        let saturated = format!("name{}", u64::MAX);
        table.allocate(1, Some(saturated.as_str()));
        let id = table.allocate(2, Some("name"));
        let again = table.allocate(3, Some("name"));
        assert_eq!(table.name_of(id), Some("name"));
        assert_eq!(table.name_of(again), Some("name2"));
    }
}
