//! Statement Builder 模块
//!
//! 纯格式化：把语句状态渲染为 SQL 片段。每个片段在不适用时返回空串，
//! 否则以换行和关键字开头，元素各占一行并缩进四个空格。

pub mod delete_builder;
pub mod insert_builder;
pub mod select_builder;
pub mod update_builder;

pub use delete_builder::DeleteBuilder;
pub use insert_builder::InsertBuilder;
pub use select_builder::{FromSlot, SelectBuilder};
pub use update_builder::UpdateBuilder;

use crate::condition::Conditions;
use crate::dialect::DmlLimit;
use crate::query::{Flags, LimitOffset};

const INDENT: &str = "    ";

/// 逗号分隔、逐行缩进
pub(crate) fn indent_csv<S: AsRef<str>>(list: &[S]) -> String {
    let mut out = String::new();
    for (i, item) in list.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push('\n');
        out.push_str(INDENT);
        out.push_str(item.as_ref());
    }
    out
}

/// 逐行缩进
pub(crate) fn indent<S: AsRef<str>>(list: &[S]) -> String {
    let mut out = String::new();
    for item in list {
        out.push('\n');
        out.push_str(INDENT);
        out.push_str(item.as_ref());
    }
    out
}

pub(crate) fn build_flags(flags: &Flags) -> String {
    if flags.is_empty() {
        return String::new();
    }
    format!(" {}", flags.as_slice().join(" "))
}

pub(crate) fn build_where(conditions: &Conditions) -> String {
    if conditions.is_empty() {
        return String::new();
    }
    format!("\nWHERE{}", indent(conditions.as_slice()))
}

pub(crate) fn build_order_by(order_by: &[String]) -> String {
    if order_by.is_empty() {
        return String::new();
    }
    format!("\nORDER BY{}", indent_csv(order_by))
}

pub(crate) fn build_limit(limit: u64) -> String {
    if limit == 0 {
        return String::new();
    }
    format!("\nLIMIT {}", limit)
}

pub(crate) fn build_limit_offset(limit: u64, offset: u64) -> String {
    let mut clause = String::new();
    if limit != 0 {
        clause.push_str(&format!("LIMIT {}", limit));
    }
    if offset != 0 {
        clause.push_str(&format!(" OFFSET {}", offset));
    }
    if clause.is_empty() {
        return clause;
    }
    format!("\n{}", clause.trim())
}

/// UPDATE / DELETE 尾部的行数限制，按方言决定是否带 OFFSET
pub(crate) fn build_dml_limit(support: DmlLimit, state: &LimitOffset) -> String {
    match support {
        DmlLimit::None => String::new(),
        DmlLimit::Limit => build_limit(state.limit()),
        DmlLimit::LimitOffset => build_limit_offset(state.limit(), state.offset()),
    }
}

pub(crate) fn build_returning(returning: &[String]) -> String {
    if returning.is_empty() {
        return String::new();
    }
    format!("\nRETURNING{}", indent_csv(returning))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_helpers() {
        assert_eq!(indent_csv(&["a", "b"]), "\n    a,\n    b");
        assert_eq!(indent(&["a", "AND b"]), "\n    a\n    AND b");
    }

    #[test]
    fn test_limit_offset_fragments() {
        assert_eq!(build_limit_offset(0, 0), "");
        assert_eq!(build_limit_offset(10, 0), "\nLIMIT 10");
        assert_eq!(build_limit_offset(0, 40), "\nOFFSET 40");
        assert_eq!(build_limit_offset(10, 40), "\nLIMIT 10 OFFSET 40");
        assert_eq!(build_limit(0), "");
    }

    #[test]
    fn test_dml_limit() {
        let mut state = LimitOffset::default();
        state.set_limit(5);
        state.set_offset(2);
        assert_eq!(build_dml_limit(DmlLimit::None, &state), "");
        assert_eq!(build_dml_limit(DmlLimit::Limit, &state), "\nLIMIT 5");
        assert_eq!(build_dml_limit(DmlLimit::LimitOffset, &state), "\nLIMIT 5 OFFSET 2");
    }

    #[test]
    fn test_flags_and_returning() {
        let mut flags = Flags::default();
        assert_eq!(build_flags(&flags), "");
        flags.set("LOW_PRIORITY", true);
        flags.set("IGNORE", true);
        assert_eq!(build_flags(&flags), " LOW_PRIORITY IGNORE");
        assert_eq!(build_returning(&["id".to_string()]), "\nRETURNING\n    id");
    }
}
