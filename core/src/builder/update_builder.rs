//! Update Builder

use super::{build_dml_limit, indent_csv};
use crate::dialect::DialectPolicy;
use crate::query::LimitOffset;

#[derive(Debug, Clone, Copy)]
pub struct UpdateBuilder {
    policy: &'static DialectPolicy,
}

impl UpdateBuilder {
    pub fn new(policy: &'static DialectPolicy) -> Self {
        Self { policy }
    }

    pub fn build_table(&self, table: &str) -> String {
        format!(" {}", table)
    }

    pub fn build_values_for_update(&self, col_values: &[(String, String)]) -> String {
        let values: Vec<String> = col_values
            .iter()
            .map(|(col, value)| format!("{} = {}", col, value))
            .collect();
        format!("\nSET{}", indent_csv(&values))
    }

    pub fn build_limit(&self, state: &LimitOffset) -> String {
        build_dml_limit(self.policy.update_limit, state)
    }
}
