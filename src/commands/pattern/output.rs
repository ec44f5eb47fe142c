//! Output formatting for pattern command results.

use super::execute::PatternResult;
use crate::output::{push_params, push_section, Outputable};

impl Outputable for PatternResult {
    fn to_table(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Pattern: {} ({} conditions)", self.kind, self.mode));
        lines.push(String::new());

        push_section(&mut lines, "Script", &self.script);
        push_params(&mut lines, &self.params);

        if let Some(interpolated) = &self.interpolated {
            push_section(&mut lines, "Interpolated", interpolated);
        }

        lines.join("\n")
    }
}
