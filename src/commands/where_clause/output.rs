//! Output formatting for where command results.

use super::execute::WhereResult;
use crate::output::{push_params, push_section, Outputable};

impl Outputable for WhereResult {
    fn to_table(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Where: {}", self.conditions));
        lines.push(String::new());

        if self.script.is_empty() {
            lines.push("No conditions.".to_string());
            return lines.join("\n");
        }

        push_section(&mut lines, "Script", &self.script);
        push_params(&mut lines, &self.params);

        if let Some(interpolated) = &self.interpolated {
            push_section(&mut lines, "Interpolated", interpolated);
        }

        lines.join("\n")
    }
}
