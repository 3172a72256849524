//! 语句工厂
//!
//! 根据方言标识创建 Select / Insert / Update / Delete。各语句的 builder
//! 在第一次使用时创建并缓存，之后每个新语句都复用同一个 builder。

use std::collections::HashMap;

use once_cell::unsync::OnceCell;
use serde::Deserialize;

use crate::builder::{DeleteBuilder, InsertBuilder, SelectBuilder, UpdateBuilder};
use crate::delete::Delete;
use crate::dialect::Dialect;
use crate::error::{Result, SqlQueryError};
use crate::insert::Insert;
use crate::quoter::Quoter;
use crate::select::Select;
use crate::update::Update;

fn default_paging() -> u64 {
    10
}

/// 工厂配置
///
/// ```
/// use sqlquery::{Dialect, FactoryConfig, QueryFactory};
///
/// let config = FactoryConfig::from_json(r#"{ "dialect": "mysql", "paging": 50 }"#).unwrap();
/// let factory = QueryFactory::from_config(&config);
/// assert_eq!(factory.dialect(), Dialect::MySql);
/// assert_eq!(factory.new_select().get_paging(), 50);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
    /// 方言标识，如 `mysql`、`pgsql`、`sqlite`、`sqlsrv`
    pub dialect: String,
    /// 为 true 时无论 `dialect` 是什么都使用通用方言
    pub common: bool,
    /// 新建 SELECT 的每页行数
    #[serde(default = "default_paging")]
    pub paging: u64,
    /// `table.col` => 自增序列名
    pub last_insert_id_names: HashMap<String, String>,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            dialect: String::new(),
            common: false,
            paging: default_paging(),
            last_insert_id_names: HashMap::new(),
        }
    }
}

impl FactoryConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| SqlQueryError::InvalidConfig(e.to_string()))
    }
}

/// 语句工厂
#[derive(Debug)]
pub struct QueryFactory {
    dialect: Dialect,
    paging: u64,
    last_insert_id_names: HashMap<String, String>,
    select_builder: OnceCell<SelectBuilder>,
    insert_builder: OnceCell<InsertBuilder>,
    update_builder: OnceCell<UpdateBuilder>,
    delete_builder: OnceCell<DeleteBuilder>,
}

impl QueryFactory {
    /// 按方言标识创建（不区分大小写），无法识别的标识使用通用方言
    pub fn new(db: &str) -> Self {
        Self::with_common(db, false)
    }

    /// `common` 为 true 时强制使用通用方言
    pub fn with_common(db: &str, common: bool) -> Self {
        let dialect = if common { Dialect::Common } else { Dialect::from_key(db) };
        tracing::debug!(db, common, dialect = %dialect, "query factory dialect resolved");
        Self::with_dialect(dialect)
    }

    pub fn with_dialect(dialect: Dialect) -> Self {
        Self {
            dialect,
            paging: default_paging(),
            last_insert_id_names: HashMap::new(),
            select_builder: OnceCell::new(),
            insert_builder: OnceCell::new(),
            update_builder: OnceCell::new(),
            delete_builder: OnceCell::new(),
        }
    }

    pub fn from_config(config: &FactoryConfig) -> Self {
        let mut factory = Self::with_common(&config.dialect, config.common);
        factory.paging = config.paging;
        factory.last_insert_id_names = config.last_insert_id_names.clone();
        factory
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn quoter(&self) -> Quoter {
        self.dialect.quoter()
    }

    /// 之后创建的每个 Insert 都会带上这份映射
    pub fn set_last_insert_id_names(&mut self, names: HashMap<String, String>) {
        self.last_insert_id_names = names;
    }

    pub fn new_select(&self) -> Select {
        let builder = *self
            .select_builder
            .get_or_init(|| SelectBuilder::new(self.dialect.policy()));
        let mut select = Select::with_builder(self.dialect, builder);
        select.set_paging(self.paging);
        select
    }

    pub fn new_insert(&self) -> Insert {
        let builder = *self
            .insert_builder
            .get_or_init(|| InsertBuilder::new(self.dialect.policy()));
        let mut insert = Insert::with_builder(self.dialect, builder);
        insert.set_last_insert_id_names(self.last_insert_id_names.clone());
        insert
    }

    pub fn new_update(&self) -> Update {
        let builder = *self
            .update_builder
            .get_or_init(|| UpdateBuilder::new(self.dialect.policy()));
        Update::with_builder(self.dialect, builder)
    }

    pub fn new_delete(&self) -> Delete {
        let builder = *self
            .delete_builder
            .get_or_init(|| DeleteBuilder::new(self.dialect.policy()));
        Delete::with_builder(self.dialect, builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Statement;

    #[test]
    fn test_dialect_keys() {
        let cases = [
            ("Common", Dialect::Common),
            ("Mysql", Dialect::MySql),
            ("Pgsql", Dialect::Postgres),
            ("postgres", Dialect::Postgres),
            ("Sqlite", Dialect::Sqlite),
            ("Sqlsrv", Dialect::SqlServer),
            ("oracle", Dialect::Common),
        ];
        for (db, expect) in cases {
            let factory = QueryFactory::new(db);
            assert_eq!(factory.dialect(), expect, "db = {}", db);
            assert_eq!(factory.new_select().dialect(), expect);
            assert_eq!(factory.new_insert().dialect(), expect);
            assert_eq!(factory.new_update().dialect(), expect);
            assert_eq!(factory.new_delete().dialect(), expect);
        }
    }

    #[test]
    fn test_force_common() {
        for db in ["Common", "Mysql", "Pgsql", "Sqlite", "Sqlsrv"] {
            let factory = QueryFactory::with_common(db, true);
            assert_eq!(factory.new_select().dialect(), Dialect::Common);
            assert_eq!(factory.new_delete().quote_name_prefix(), "\"");
        }
    }

    #[test]
    fn test_builders_are_cached() {
        let factory = QueryFactory::new("mysql");
        assert!(factory.select_builder.get().is_none());
        factory.new_select();
        factory.new_select();
        assert!(factory.select_builder.get().is_some());
        assert!(factory.insert_builder.get().is_none());
    }

    #[test]
    fn test_last_insert_id_names_propagate() {
        let mut factory = QueryFactory::new("mysql");
        factory.set_last_insert_id_names(HashMap::from([(
            "t.id".to_string(),
            "t_id_custom".to_string(),
        )]));
        let mut insert = factory.new_insert();
        insert.into_table("t");
        assert_eq!(insert.get_last_insert_id_name("id").as_deref(), Some("t_id_custom"));
    }

    #[test]
    fn test_config_defaults_and_errors() {
        let config = FactoryConfig::from_json("{}").unwrap();
        assert_eq!(config, FactoryConfig::default());
        assert_eq!(config.paging, 10);

        let config = FactoryConfig::from_json(r#"{ "dialect": "mysql", "common": true }"#).unwrap();
        assert_eq!(QueryFactory::from_config(&config).dialect(), Dialect::Common);

        let err = FactoryConfig::from_json("{ \"paging\": \"ten\" }").unwrap_err();
        assert!(matches!(err, SqlQueryError::InvalidConfig(_)));
    }
}
