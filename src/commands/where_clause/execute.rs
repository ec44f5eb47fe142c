use std::error::Error;

use log::debug;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::WhereCmd;
use crate::builder::clauses::Where;
use crate::builder::helpers::format_params_debug;
use crate::builder::{Clause, Params};
use crate::commands::Execute;
use crate::config::ConfigFile;

#[derive(Error, Debug)]
enum WhereCmdError {
    #[error("Invalid conditions JSON: {message}")]
    InvalidJson { message: String },
}

/// Result of the where command execution
#[derive(Debug, Default, Serialize)]
pub struct WhereResult {
    pub conditions: Value,
    pub script: String,
    pub params: Params,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpolated: Option<String>,
}

impl Execute for WhereCmd {
    type Output = WhereResult;

    fn execute(self, config: &ConfigFile) -> Result<Self::Output, Box<dyn Error>> {
        let conditions: Value = serde_json::from_str(&self.conditions)
            .map_err(|e| WhereCmdError::InvalidJson { message: e.to_string() })?;

        let max_depth = self
            .max_depth
            .map(|depth| depth as usize)
            .unwrap_or(config.render.max_depth);

        let compiled = Where::from_json(&conditions, max_depth)?.compile()?;
        debug!(
            "where: {} with {}",
            compiled.script,
            format_params_debug(&compiled.params)
        );

        let interpolated =
            (self.interpolate || config.render.interpolate).then(|| compiled.interpolated());

        Ok(WhereResult {
            conditions,
            script: compiled.script,
            params: compiled.params,
            interpolated,
        })
    }
}
