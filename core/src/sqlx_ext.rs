//! 与 sqlx 的衔接
//!
//! 把 [`PreparedQuery`] 转为 `sqlx::query::Query` 并按顺序绑定参数。本 crate 只负责构造，
//! 执行由调用方在自己的连接池上完成：
//!
//! ```ignore
//! let prepared = select.prepare()?;
//! let rows = sqlquery::sqlx_ext::query::<sqlx::MySql>(&prepared)
//!     .fetch_all(&pool)
//!     .await?;
//! ```

use sqlx::Database;

use crate::positional::PreparedQuery;
use crate::value::BindValue;

/// 将单个绑定值应用到查询
macro_rules! apply_bind_value {
    ($query:expr, $bind:expr) => {
        match $bind {
            BindValue::String(s) => {
                $query = $query.bind(s);
            }
            BindValue::Int64(i) => {
                $query = $query.bind(i);
            }
            BindValue::Int32(i) => {
                $query = $query.bind(i);
            }
            BindValue::Int16(i) => {
                $query = $query.bind(i);
            }
            BindValue::Float64(f) => {
                $query = $query.bind(f);
            }
            BindValue::Float32(f) => {
                $query = $query.bind(f);
            }
            BindValue::Bool(b) => {
                $query = $query.bind(b);
            }
            BindValue::Bytes(b) => {
                $query = $query.bind(b);
            }
            BindValue::Null => {
                $query = $query.bind(Option::<String>::None);
            }
            // to_positional 已经展开顶层列表，这里只剩嵌套列表，按 JSON 文本绑定
            BindValue::Array(items) => {
                $query = $query.bind(serde_json::to_string(items).unwrap_or_default());
            }
        }
    };
}

/// 将绑定值按顺序应用到查询中
///
/// 只要求三种数据库（MySQL、PostgreSQL、SQLite）都支持的基本类型。
pub fn apply_binds<'q, DB>(
    mut query: sqlx::query::Query<'q, DB, DB::Arguments<'q>>,
    binds: &'q [BindValue],
) -> sqlx::query::Query<'q, DB, DB::Arguments<'q>>
where
    DB: Database,
    for<'a> DB::Arguments<'a>: sqlx::IntoArguments<'a, DB>,
    String: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    i64: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    i32: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    i16: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    f64: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    f32: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    bool: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    Vec<u8>: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    Option<String>: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
{
    for bind in binds {
        apply_bind_value!(query, bind);
    }
    query
}

/// 由 [`PreparedQuery`] 构造带参数的 sqlx 查询
pub fn query<'q, DB>(prepared: &'q PreparedQuery) -> sqlx::query::Query<'q, DB, DB::Arguments<'q>>
where
    DB: Database,
    for<'a> DB::Arguments<'a>: sqlx::IntoArguments<'a, DB>,
    String: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    i64: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    i32: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    i16: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    f64: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    f32: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    bool: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    Vec<u8>: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    Option<String>: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
{
    apply_binds(sqlx::query::<DB>(&prepared.sql), &prepared.binds)
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use super::*;
    use crate::{binds, HasWhere, QueryFactory, Statement};

    #[test]
    fn test_query_from_select() {
        let factory = QueryFactory::new("sqlite");
        let mut select = factory.new_select();
        select.cols(["id"]).from("t").unwrap();
        select
            .and_where_bind("id IN (:ids)", binds! { "ids" => vec![1i64, 2] })
            .unwrap();
        let prepared = select.prepare().unwrap();
        assert_eq!(prepared.sql, "SELECT\n    id\nFROM\n    \"t\"\nWHERE\n    id IN (?, ?)");

        let query = query::<sqlx::Sqlite>(&prepared);
        assert_eq!(sqlx::Execute::sql(&query), prepared.sql);
    }
}
