//! 多方言 SQL 语句构造器
//!
//! 通过 [`QueryFactory`] 按方言（通用、MySQL、PostgreSQL、SQLite、SQL Server）创建
//! [`Select`]、[`Insert`]、[`Update`]、[`Delete`]，以链式调用组装语句，最后得到
//! 带 `:name` 命名占位符的 SQL 文本与绑定值。
//!
//! ```
//! use sqlquery::{binds, HasLimit, HasOrderBy, HasWhere, QueryFactory, Statement};
//!
//! let factory = QueryFactory::new("postgres");
//! let mut select = factory.new_select();
//! select.cols(["id", "name"]).from("users").unwrap();
//! select.and_where_bind("age > :age", binds! { "age" => 18i64 }).unwrap();
//! select.order_by(["name"]).limit(20);
//!
//! let sql = select.statement().unwrap();
//! assert!(sql.ends_with("LIMIT 20"));
//!
//! let prepared = select.prepare().unwrap();
//! assert!(prepared.sql.contains("age > $1"));
//! ```

pub mod builder;
pub mod condition;
pub mod delete;
pub mod dialect;
pub mod error;
pub mod factory;
pub mod insert;
pub mod positional;
pub mod query;
pub mod quoter;
pub mod select;
#[cfg(any(feature = "mysql", feature = "postgres", feature = "sqlite"))]
pub mod sqlx_ext;
pub mod traits;
pub mod update;
pub mod value;

#[cfg(test)]
mod test_utils;

pub use condition::Connective;
pub use delete::Delete;
pub use dialect::{Dialect, DialectPolicy};
pub use error::{Result, SqlQueryError};
pub use factory::{FactoryConfig, QueryFactory};
pub use insert::Insert;
pub use positional::{to_positional, PreparedQuery};
pub use quoter::Quoter;
pub use select::{ColKey, Select, SubSelect};
pub use traits::{HasLimit, HasLimitOffset, HasOrderBy, HasReturning, HasWhere, Statement};
pub use update::Update;
pub use value::{Bind, BindMap, BindValue, Binds};
