//! Inline property conditions of node and relation patterns.
//!
//! The property map of a pattern such as `(n:Person { name: $name })` is bound
//! to parameters in one of two modes:
//!
//! - **Expanded**: one parameter per property, rendered `{ k1: $k1, k2: $k2 }`.
//! - **Condensed**: one parameter holding the whole map, rendered `$conditions`.
//!
//! `MATCH` wants the expanded form, `CREATE` and `MERGE` the condensed one.
//! Switching modes releases the old parameters before allocating new ones.

use log::debug;
use serde_json::{Map, Value};

use super::fragment::Fragment;
use super::params::{ParamId, ParameterTable};
use crate::escape::quote_identifier;

/// Name requested for the single parameter of condensed conditions.
pub const CONDENSED_PARAM_NAME: &str = "conditions";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConditionMode {
    #[default]
    Expanded,
    Condensed,
}

#[derive(Debug, Clone, PartialEq)]
enum Binding {
    Unbound,
    Expanded(Vec<(String, ParamId)>),
    Condensed(ParamId),
}

/// A pattern's property map together with the parameters it is bound to.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternConditions {
    conditions: Map<String, Value>,
    mode: ConditionMode,
    binding: Binding,
}

impl PatternConditions {
    /// Bind `conditions` into `table` using `mode`.
    pub fn bind(table: &mut ParameterTable, conditions: Map<String, Value>, mode: ConditionMode) -> Self {
        let mut bound = Self {
            conditions,
            mode,
            binding: Binding::Unbound,
        };
        bound.rebind(table);
        bound
    }

    pub fn mode(&self) -> ConditionMode {
        self.mode
    }

    pub fn conditions(&self) -> &Map<String, Value> {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Switch to `mode`, rebinding parameters in `table` if it changes.
    ///
    /// `table` must be the table the conditions are currently bound in.
    pub fn set_mode(&mut self, table: &mut ParameterTable, mode: ConditionMode) {
        if self.mode == mode {
            return;
        }
        debug!("rebinding pattern conditions from {:?} to {:?}", self.mode, mode);
        self.mode = mode;
        self.rebind(table);
    }

    /// Remove every parameter owned by these conditions from `table`.
    pub fn release(&mut self, table: &mut ParameterTable) {
        for id in self.param_ids() {
            table.remove_id(id);
        }
        self.binding = Binding::Unbound;
    }

    fn rebind(&mut self, table: &mut ParameterTable) {
        self.release(table);

        // An empty map renders as nothing, so it owns no parameters
        if self.conditions.is_empty() {
            return;
        }

        self.binding = match self.mode {
            ConditionMode::Expanded => Binding::Expanded(
                self.conditions
                    .iter()
                    .map(|(key, value)| (key.clone(), table.allocate(value.clone(), Some(key))))
                    .collect(),
            ),
            ConditionMode::Condensed => Binding::Condensed(table.allocate(
                Value::Object(self.conditions.clone()),
                Some(CONDENSED_PARAM_NAME),
            )),
        };
    }

    /// Handles of the parameters currently owned by these conditions.
    pub fn param_ids(&self) -> Vec<ParamId> {
        match &self.binding {
            Binding::Unbound => Vec::new(),
            Binding::Expanded(pairs) => pairs.iter().map(|(_, id)| *id).collect(),
            Binding::Condensed(id) => vec![*id],
        }
    }

    /// Render the bound conditions. Empty conditions render as an empty fragment.
    ///
    /// The condensed form is the bare placeholder; braces are not added.
    pub fn render(&self) -> Fragment {
        match &self.binding {
            Binding::Unbound => Fragment::new(),
            Binding::Expanded(pairs) => {
                let entries = pairs.iter().map(|(key, id)| {
                    let mut entry = Fragment::text(format!("{}: ", quote_identifier(key)));
                    entry.push_param(*id);
                    entry
                });
                let mut fragment = Fragment::text("{ ");
                fragment.append(Fragment::join(entries, ", "));
                fragment.push_str(" }");
                fragment
            }
            Binding::Condensed(id) => Fragment::param(*id),
        }
    }
}
