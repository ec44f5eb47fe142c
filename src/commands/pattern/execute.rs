use std::error::Error;

use log::debug;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::PatternCmd;
use crate::builder::pattern_conditions::ConditionMode;
use crate::builder::patterns::{NodePattern, Pattern, PatternArgs, RelationPattern};
use crate::builder::{Clause, Params};
use crate::commands::Execute;
use crate::config::ConfigFile;

#[derive(Error, Debug)]
enum PatternCmdError {
    #[error("Invalid conditions JSON: {message}")]
    InvalidJson { message: String },
}

/// Result of the pattern command execution
#[derive(Debug, Default, Serialize)]
pub struct PatternResult {
    pub kind: String,
    pub mode: String,
    pub script: String,
    pub params: Params,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpolated: Option<String>,
}

impl Execute for PatternCmd {
    type Output = PatternResult;

    fn execute(self, config: &ConfigFile) -> Result<Self::Output, Box<dyn Error>> {
        let conditions = self
            .conditions
            .as_deref()
            .map(serde_json::from_str::<Value>)
            .transpose()
            .map_err(|e| PatternCmdError::InvalidJson { message: e.to_string() })?;

        let name = self.name.map(Value::String);
        let labels = (!self.labels.is_empty())
            .then(|| Value::Array(self.labels.into_iter().map(Value::String).collect()));
        let args = PatternArgs::parse(name.as_ref(), labels.as_ref(), conditions.as_ref())?;

        let (kind, mut pattern): (&str, Pattern) = match self.relation {
            Some(direction) => ("relation", RelationPattern::new(direction.into(), args).into()),
            None => ("node", NodePattern::new(args).into()),
        };

        let mode = if self.condensed {
            ConditionMode::Condensed
        } else {
            ConditionMode::Expanded
        };
        pattern.set_condition_mode(mode);

        let compiled = pattern.compile()?;
        debug!("pattern: {} ({} parameter(s))", compiled.script, compiled.param_count());

        let interpolated =
            (self.interpolate || config.render.interpolate).then(|| compiled.interpolated());

        Ok(PatternResult {
            kind: kind.to_string(),
            mode: mode_name(mode).to_string(),
            script: compiled.script,
            params: compiled.params,
            interpolated,
        })
    }
}

fn mode_name(mode: ConditionMode) -> &'static str {
    match mode {
        ConditionMode::Expanded => "expanded",
        ConditionMode::Condensed => "condensed",
    }
}
