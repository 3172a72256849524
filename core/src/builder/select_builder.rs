//! Select Builder

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::{build_limit_offset, indent, indent_csv};
use crate::dialect::{DialectPolicy, Pagination};
use crate::error::{Result, SqlQueryError};

static SELECT_HEAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(SELECT( DISTINCT)?)").expect("select head pattern is valid"));

/// FROM 中的一个表引用，以及挂在它后面的 JOIN 片段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FromSlot {
    pub table: String,
    pub joins: Vec<String>,
}

/// Select Builder - 渲染 SELECT 的各个片段
#[derive(Debug, Clone, Copy)]
pub struct SelectBuilder {
    policy: &'static DialectPolicy,
}

impl SelectBuilder {
    pub fn new(policy: &'static DialectPolicy) -> Self {
        Self { policy }
    }

    pub fn build_cols(&self, cols: &[String]) -> Result<String> {
        if cols.is_empty() {
            return Err(SqlQueryError::NoColumns);
        }
        Ok(indent_csv(cols))
    }

    pub fn build_from(&self, from: &[FromSlot]) -> String {
        if from.is_empty() {
            return String::new();
        }
        let refs: Vec<String> = from
            .iter()
            .map(|slot| {
                let mut parts = Vec::with_capacity(slot.joins.len() + 1);
                parts.push(slot.table.as_str());
                parts.extend(slot.joins.iter().map(String::as_str));
                parts.join("\n")
            })
            .collect();
        format!("\nFROM{}", indent_csv(&refs))
    }

    pub fn build_group_by(&self, group_by: &[String]) -> String {
        if group_by.is_empty() {
            return String::new();
        }
        format!("\nGROUP BY{}", indent_csv(group_by))
    }

    pub fn build_having(&self, having: &[String]) -> String {
        if having.is_empty() {
            return String::new();
        }
        format!("\nHAVING{}", indent(having))
    }

    /// 语句尾部的 LIMIT / OFFSET；TOP 方言在 [`apply_limit`](Self::apply_limit) 中处理
    pub fn build_limit_offset(&self, limit: u64, offset: u64) -> String {
        match self.policy.pagination {
            Pagination::LimitOffset => build_limit_offset(limit, offset),
            Pagination::TopOffsetFetch => String::new(),
        }
    }

    pub fn build_for_update(&self, for_update: bool) -> String {
        if for_update {
            "\nFOR UPDATE".to_string()
        } else {
            String::new()
        }
    }

    /// 对渲染好的语句应用 TOP / OFFSET FETCH 分页
    pub fn apply_limit(&self, stm: String, limit: u64, offset: u64) -> String {
        if self.policy.pagination != Pagination::TopOffsetFetch || (limit == 0 && offset == 0) {
            return stm;
        }
        if offset == 0 {
            return SELECT_HEAD
                .replace(&stm, |caps: &Captures| format!("{} TOP {}", &caps[1], limit))
                .into_owned();
        }
        // OFFSET 是 ORDER BY 的子句，调用方需要自行提供 ORDER BY
        format!("{}\nOFFSET {} ROWS FETCH NEXT {} ROWS ONLY", stm, offset, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;

    #[test]
    fn test_build_cols_requires_columns() {
        let builder = SelectBuilder::new(Dialect::Common.policy());
        assert_eq!(builder.build_cols(&[]), Err(SqlQueryError::NoColumns));
    }

    #[test]
    fn test_build_from_with_joins() {
        let builder = SelectBuilder::new(Dialect::Common.policy());
        let from = vec![
            FromSlot {
                table: "t1".into(),
                joins: vec!["LEFT JOIN t2 ON t2.id = t1.id".into()],
            },
            FromSlot {
                table: "t3".into(),
                joins: vec![],
            },
        ];
        assert_eq!(
            builder.build_from(&from),
            "\nFROM\n    t1\nLEFT JOIN t2 ON t2.id = t1.id,\n    t3"
        );
    }

    #[test]
    fn test_apply_limit_top() {
        let builder = SelectBuilder::new(Dialect::SqlServer.policy());
        assert_eq!(builder.build_limit_offset(10, 0), "");
        assert_eq!(
            builder.apply_limit("SELECT DISTINCT\n    a".to_string(), 10, 0),
            "SELECT DISTINCT TOP 10\n    a"
        );
        assert_eq!(
            builder.apply_limit("SELECT\n    a".to_string(), 10, 40),
            "SELECT\n    a\nOFFSET 40 ROWS FETCH NEXT 10 ROWS ONLY"
        );
        assert_eq!(builder.apply_limit("SELECT\n    a".to_string(), 0, 0), "SELECT\n    a");
    }

    #[test]
    fn test_apply_limit_noop_for_limit_offset_dialects() {
        let builder = SelectBuilder::new(Dialect::MySql.policy());
        assert_eq!(builder.apply_limit("SELECT 1".to_string(), 10, 0), "SELECT 1");
    }
}
