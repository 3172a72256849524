//! 方言注册表
//!
//! 每个 [`Dialect`] 对应一份静态的 [`DialectPolicy`]，描述该方言的标识符引用符号、
//! 分页语法、UPSERT / REPLACE 写法、RETURNING 支持以及各语句允许的修饰符。
//! 语句类型只有一套实现，差异全部由注入的策略决定。

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::quoter::Quoter;

/// 目标数据库方言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Common,
    MySql,
    Postgres,
    Sqlite,
    SqlServer,
}

impl Dialect {
    /// 从方言标识解析（不区分大小写），无法识别时回退到 `Common`
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "mysql" => Dialect::MySql,
            "pgsql" | "postgres" => Dialect::Postgres,
            "sqlite" => Dialect::Sqlite,
            "sqlsrv" | "sqlserver" => Dialect::SqlServer,
            _ => Dialect::Common,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Common => "common",
            Dialect::MySql => "mysql",
            Dialect::Postgres => "postgres",
            Dialect::Sqlite => "sqlite",
            Dialect::SqlServer => "sqlserver",
        }
    }

    pub fn policy(&self) -> &'static DialectPolicy {
        match self {
            Dialect::Common => &COMMON,
            Dialect::MySql => &MYSQL,
            Dialect::Postgres => &POSTGRES,
            Dialect::Sqlite => &SQLITE,
            Dialect::SqlServer => &SQLSERVER,
        }
    }

    pub fn quoter(&self) -> Quoter {
        self.policy().quoter
    }

    /// 位置参数占位符，`index` 从 0 开始
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${}", index + 1),
            Dialect::SqlServer => format!("@p{}", index + 1),
            Dialect::Common | Dialect::MySql | Dialect::Sqlite => "?".to_string(),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// SELECT 的分页写法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    /// `LIMIT n OFFSET m`
    LimitOffset,
    /// `SELECT TOP n` 或 `OFFSET m ROWS FETCH NEXT n ROWS ONLY`
    TopOffsetFetch,
}

/// INSERT 改写为 REPLACE 的方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replace {
    Unsupported,
    /// 语句关键字 `INSERT` 替换为 `REPLACE`
    Keyword,
    /// `INSERT OR REPLACE`
    OrReplaceFlag,
}

/// UPDATE / DELETE 支持的 ORDER BY 与行数限制
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmlLimit {
    None,
    Limit,
    LimitOffset,
}

impl DmlLimit {
    pub fn allows_order_by(&self) -> bool {
        !matches!(self, DmlLimit::None)
    }

    pub fn allows_limit(&self) -> bool {
        !matches!(self, DmlLimit::None)
    }

    pub fn allows_offset(&self) -> bool {
        matches!(self, DmlLimit::LimitOffset)
    }
}

/// 语句种类，用于查找允许的修饰符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

/// 方言策略
#[derive(Debug)]
pub struct DialectPolicy {
    pub dialect: Dialect,
    pub quoter: Quoter,
    pub pagination: Pagination,
    pub on_duplicate_key: bool,
    pub replace: Replace,
    pub returning: bool,
    /// `get_last_insert_id_name` 找不到时是否回退到 `<table>_<col>_seq`
    pub sequence_fallback: bool,
    pub update_limit: DmlLimit,
    pub delete_limit: DmlLimit,
    pub select_flags: &'static [&'static str],
    pub insert_flags: &'static [&'static str],
    pub update_flags: &'static [&'static str],
    pub delete_flags: &'static [&'static str],
}

impl DialectPolicy {
    pub fn allowed_flags(&self, kind: StatementKind) -> &'static [&'static str] {
        match kind {
            StatementKind::Select => self.select_flags,
            StatementKind::Insert => self.insert_flags,
            StatementKind::Update => self.update_flags,
            StatementKind::Delete => self.delete_flags,
        }
    }

    pub fn allows_flag(&self, kind: StatementKind, flag: &str) -> bool {
        self.allowed_flags(kind).contains(&flag)
    }
}

const SQLITE_CONFLICT_FLAGS: &[&str] = &["OR ABORT", "OR FAIL", "OR IGNORE", "OR REPLACE", "OR ROLLBACK"];

static COMMON: DialectPolicy = DialectPolicy {
    dialect: Dialect::Common,
    quoter: Quoter::new("\"", "\""),
    pagination: Pagination::LimitOffset,
    on_duplicate_key: false,
    replace: Replace::Unsupported,
    returning: false,
    sequence_fallback: false,
    update_limit: DmlLimit::None,
    delete_limit: DmlLimit::None,
    select_flags: &[],
    insert_flags: &[],
    update_flags: &[],
    delete_flags: &[],
};

static MYSQL: DialectPolicy = DialectPolicy {
    dialect: Dialect::MySql,
    quoter: Quoter::new("`", "`"),
    pagination: Pagination::LimitOffset,
    on_duplicate_key: true,
    replace: Replace::Keyword,
    returning: false,
    sequence_fallback: false,
    update_limit: DmlLimit::Limit,
    delete_limit: DmlLimit::Limit,
    select_flags: &[
        "SQL_CALC_FOUND_ROWS",
        "SQL_CACHE",
        "SQL_NO_CACHE",
        "STRAIGHT_JOIN",
        "HIGH_PRIORITY",
        "SQL_SMALL_RESULT",
        "SQL_BIG_RESULT",
        "SQL_BUFFER_RESULT",
    ],
    insert_flags: &["HIGH_PRIORITY", "LOW_PRIORITY", "IGNORE", "DELAYED"],
    update_flags: &["LOW_PRIORITY", "IGNORE"],
    delete_flags: &["LOW_PRIORITY", "IGNORE", "QUICK"],
};

static POSTGRES: DialectPolicy = DialectPolicy {
    dialect: Dialect::Postgres,
    quoter: Quoter::new("\"", "\""),
    pagination: Pagination::LimitOffset,
    on_duplicate_key: false,
    replace: Replace::Unsupported,
    returning: true,
    sequence_fallback: true,
    update_limit: DmlLimit::None,
    delete_limit: DmlLimit::None,
    select_flags: &[],
    insert_flags: &[],
    update_flags: &[],
    delete_flags: &[],
};

static SQLITE: DialectPolicy = DialectPolicy {
    dialect: Dialect::Sqlite,
    quoter: Quoter::new("\"", "\""),
    pagination: Pagination::LimitOffset,
    on_duplicate_key: false,
    replace: Replace::OrReplaceFlag,
    returning: false,
    sequence_fallback: false,
    update_limit: DmlLimit::LimitOffset,
    delete_limit: DmlLimit::LimitOffset,
    select_flags: &[],
    insert_flags: SQLITE_CONFLICT_FLAGS,
    update_flags: SQLITE_CONFLICT_FLAGS,
    delete_flags: &[],
};

static SQLSERVER: DialectPolicy = DialectPolicy {
    dialect: Dialect::SqlServer,
    quoter: Quoter::new("\"", "\""),
    pagination: Pagination::TopOffsetFetch,
    on_duplicate_key: false,
    replace: Replace::Unsupported,
    returning: false,
    sequence_fallback: false,
    update_limit: DmlLimit::None,
    delete_limit: DmlLimit::None,
    select_flags: &[],
    insert_flags: &[],
    update_flags: &[],
    delete_flags: &[],
};
