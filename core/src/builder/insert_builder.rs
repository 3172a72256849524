//! Insert Builder - 单行、批量与 ON DUPLICATE KEY UPDATE 片段

use super::{indent, indent_csv};
use crate::dialect::{DialectPolicy, Replace};

#[derive(Debug, Clone, Copy)]
pub struct InsertBuilder {
    policy: &'static DialectPolicy,
}

impl InsertBuilder {
    pub fn new(policy: &'static DialectPolicy) -> Self {
        Self { policy }
    }

    pub fn build_into(&self, into: &str) -> String {
        format!(" INTO {}", into)
    }

    /// 单行：` (列...) VALUES (值...)`
    pub fn build_values_for_insert(&self, col_values: &[(String, String)]) -> String {
        let cols: Vec<&str> = col_values.iter().map(|(c, _)| c.as_str()).collect();
        let values: Vec<&str> = col_values.iter().map(|(_, v)| v.as_str()).collect();
        format!(" ({}\n) VALUES ({}\n)", indent_csv(&cols), indent_csv(&values))
    }

    /// 批量：列顺序一行，随后每行一组值
    pub fn build_values_for_bulk_insert(&self, col_order: &[String], rows: &[Vec<String>]) -> String {
        let vals: Vec<String> = rows
            .iter()
            .map(|row| format!("    ({})", row.join(", ")))
            .collect();
        format!("\n    ({})\nVALUES\n{}", col_order.join(", "), vals.join(",\n"))
    }

    pub fn build_values_for_update_on_duplicate_key(&self, values: &[(String, String)]) -> String {
        if values.is_empty() || !self.policy.on_duplicate_key {
            return String::new();
        }
        let rows: Vec<String> = values
            .iter()
            .map(|(col, value)| indent(&[format!("{} = {}", col, value)]))
            .collect();
        format!(" ON DUPLICATE KEY UPDATE{}", rows.join(","))
    }

    /// `INSERT` 改写为 `REPLACE`（仅对关键字替换型方言生效）
    pub fn apply_replace(&self, stm: String, use_replace: bool) -> String {
        if !use_replace || self.policy.replace != Replace::Keyword {
            return stm;
        }
        match stm.strip_prefix("INSERT") {
            Some(rest) => format!("REPLACE{}", rest),
            None => stm,
        }
    }
}
