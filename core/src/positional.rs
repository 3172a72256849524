//! 命名占位符转位置参数
//!
//! 语句对象输出 `:name` 形式的命名占位符，而 sqlx 等驱动只接受位置参数。
//! [`to_positional`] 按出现顺序把命名占位符替换为方言的位置占位符
//! （`?`、`$n`、`@pn`），并按同样的顺序收集绑定值。

use serde::Serialize;

use crate::dialect::Dialect;
use crate::error::{Result, SqlQueryError};
use crate::value::{BindMap, BindValue};

/// 可直接交给驱动执行的 SQL 与按位置排列的参数
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedQuery {
    pub sql: String,
    pub binds: Vec<BindValue>,
}

/// 把 `sql` 中的 `:name` 替换为位置占位符
///
/// - 字符串字面量与引用标识符中的内容不处理
/// - `::` 视为类型转换（PostgreSQL），不是占位符
/// - 列表值展开为多个占位符，空列表写入 `NULL`
/// - 同一个名称出现多次时，每次都占用一个位置
///
/// ```
/// use sqlquery::{to_positional, BindMap, BindValue, Dialect};
///
/// let binds: BindMap = vec![("ids", BindValue::from(vec![1i64, 2])), ("name", "a".into())]
///     .into_iter()
///     .collect();
/// let q = to_positional("SELECT * FROM t WHERE id IN (:ids) AND name = :name", &binds, Dialect::Postgres).unwrap();
/// assert_eq!(q.sql, "SELECT * FROM t WHERE id IN ($1, $2) AND name = $3");
/// assert_eq!(q.binds.len(), 3);
/// ```
pub fn to_positional(sql: &str, binds: &BindMap, dialect: Dialect) -> Result<PreparedQuery> {
    let bytes = sql.as_bytes();
    let mut out = String::with_capacity(sql.len());
    let mut values = Vec::new();
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'\'' | b'"' | b'`') => {
                i = skip_quoted(bytes, i, quote);
            }
            b':' if bytes.get(i + 1) == Some(&b':') => {
                i += 2;
            }
            b':' if bytes.get(i + 1).is_some_and(|&b| is_name_start(b)) => {
                let start = i + 1;
                let mut end = start;
                while end < bytes.len() && is_name_char(bytes[end]) {
                    end += 1;
                }
                let name = &sql[start..end];
                let value = binds
                    .get(name)
                    .ok_or_else(|| SqlQueryError::UnboundPlaceholder(name.to_string()))?;

                out.push_str(&sql[copied..i]);
                push_placeholders(&mut out, &mut values, value, dialect);
                copied = end;
                i = end;
            }
            _ => i += 1,
        }
    }
    out.push_str(&sql[copied..]);

    Ok(PreparedQuery { sql: out, binds: values })
}

fn push_placeholders(out: &mut String, values: &mut Vec<BindValue>, value: &BindValue, dialect: Dialect) {
    match value {
        BindValue::Array(items) if items.is_empty() => out.push_str("NULL"),
        BindValue::Array(items) => {
            for (n, item) in items.iter().enumerate() {
                if n > 0 {
                    out.push_str(", ");
                }
                out.push_str(&dialect.placeholder(values.len()));
                values.push(item.clone());
            }
        }
        other => {
            out.push_str(&dialect.placeholder(values.len()));
            values.push(other.clone());
        }
    }
}

/// 跳过从 `open` 开始的引用片段，返回结束引号之后的位置；未闭合时跳到末尾
fn skip_quoted(bytes: &[u8], open: usize, quote: u8) -> usize {
    let mut i = open + 1;
    while i < bytes.len() {
        if bytes[i] == b'\\' && quote != b'`' {
            i += 2;
            continue;
        }
        if bytes[i] == quote {
            return i + 1;
        }
        i += 1;
    }
    bytes.len()
}

fn is_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
