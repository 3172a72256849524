//! INSERT 语句（含批量插入）

use std::collections::HashMap;

use crate::builder::{self, InsertBuilder};
use crate::dialect::{Dialect, Replace, StatementKind};
use crate::error::{Result, SqlQueryError};
use crate::query::{ColValues, QueryCore};
use crate::traits::{HasReturning, Statement};
use crate::value::{BindMap, BindValue};

/// INSERT 语句
///
/// 单行插入直接设置列；批量插入时用 [`add_row`](Self::add_row) 逐行追加，
/// 每一行的占位符在收尾时加上 `_<行号>` 后缀。
///
/// ```
/// use sqlquery::{QueryFactory, Statement};
///
/// let factory = QueryFactory::new("pgsql");
/// let mut insert = factory.new_insert();
/// insert.into_table("users").col_value("name", "foo").set("created_at", Some("NOW()"));
/// assert_eq!(
///     insert.statement().unwrap(),
///     "INSERT INTO \"users\" (\n    \"name\",\n    \"created_at\"\n) VALUES (\n    :name,\n    NOW()\n)"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Insert {
    core: QueryCore,
    builder: InsertBuilder,
    into: String,
    into_raw: String,
    col_values: ColValues,
    /// 批量插入的列顺序，取自第一行
    col_order: Vec<String>,
    /// 当前正在填充的行号
    row: usize,
    bulk_rows: Vec<Vec<String>>,
    bulk_binds: BindMap,
    last_insert_id_names: HashMap<String, String>,
    use_replace: bool,
    on_duplicate: ColValues,
    returning: Vec<String>,
}

impl Insert {
    pub fn new(dialect: Dialect) -> Self {
        Self::with_builder(dialect, InsertBuilder::new(dialect.policy()))
    }

    pub(crate) fn with_builder(dialect: Dialect, builder: InsertBuilder) -> Self {
        Self {
            core: QueryCore::new(dialect, StatementKind::Insert),
            builder,
            into: String::new(),
            into_raw: String::new(),
            col_values: ColValues::default(),
            col_order: Vec::new(),
            row: 0,
            bulk_rows: Vec::new(),
            bulk_binds: BindMap::new(),
            last_insert_id_names: HashMap::new(),
            use_replace: false,
            on_duplicate: ColValues::default(),
            returning: Vec::new(),
        }
    }

    pub fn into_table(&mut self, table: &str) -> &mut Self {
        self.into_raw = table.to_string();
        self.into = self.core.quoter().quote_name(table);
        self
    }

    // ========== 列 ==========

    /// 列值为 `:name` 占位符
    pub fn col(&mut self, name: &str) -> &mut Self {
        self.core.add_col(&mut self.col_values, name, None);
        self
    }

    /// 列值为 `:name` 占位符，并绑定 `value`
    pub fn col_value(&mut self, name: &str, value: impl Into<BindValue>) -> &mut Self {
        self.core.add_col(&mut self.col_values, name, Some(value.into()));
        self
    }

    pub fn cols<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.col(name.as_ref());
        }
        self
    }

    pub fn cols_values<I, K, V>(&mut self, pairs: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<BindValue>,
    {
        for (name, value) in pairs {
            self.col_value(name.as_ref(), value);
        }
        self
    }

    /// 列值直接使用表达式，不绑定；`None` 写入 `NULL`
    pub fn set(&mut self, col: &str, expr: Option<&str>) -> &mut Self {
        self.core.set_col(&mut self.col_values, col, expr);
        self
    }

    pub fn has_cols(&self) -> bool {
        !self.col_values.is_empty()
    }

    // ========== 批量插入 ==========

    /// 追加一行
    ///
    /// 尚未设置任何列时，这些列直接成为第一行；否则先收尾当前行
    /// （缺少第一行中的任何列都会返回 [`SqlQueryError::MissingColumn`]），再开始新行。
    pub fn add_row<I, K, V>(&mut self, cols: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<BindValue>,
    {
        if self.col_values.is_empty() {
            // 已有收尾的行时，新行写到下一个位置
            if !self.bulk_rows.is_empty() {
                self.row = self.bulk_rows.len();
            }
            return Ok(self.cols_values(cols));
        }
        if self.col_order.is_empty() {
            self.col_order = self.col_values.keys().map(str::to_string).collect();
        }
        self.finish_row()?;
        self.row += 1;
        Ok(self.cols_values(cols))
    }

    /// 收尾当前行并开始一个空行，之后用 `col` / `set` 等填充
    pub fn next_row(&mut self) -> Result<&mut Self> {
        self.add_row(std::iter::empty::<(&str, BindValue)>())
    }

    /// 逐行调用 [`add_row`](Self::add_row)；累计超过一行时收尾最后一行
    pub fn add_rows<R, I, K, V>(&mut self, rows: R) -> Result<&mut Self>
    where
        R: IntoIterator<Item = I>,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<BindValue>,
    {
        for cols in rows {
            self.add_row(cols)?;
        }
        if self.row > 1 {
            self.finish_row()?;
        }
        Ok(self)
    }

    /// 当前行按列顺序的值与改名后的绑定；只读，不修改状态
    fn snapshot_row(&self) -> Result<(Vec<String>, BindMap)> {
        let mut values = Vec::with_capacity(self.col_order.len());
        let mut binds = BindMap::new();
        for col in &self.col_order {
            let value = self
                .col_values
                .get(col)
                .ok_or_else(|| SqlQueryError::MissingColumn {
                    column: col.clone(),
                    row: self.row,
                })?;
            match value.strip_prefix(':') {
                Some(name) => {
                    values.push(format!("{}_{}", value, self.row));
                    if let Some(bound) = self.core.bind_values.get(name) {
                        binds.insert(format!("{}_{}", name, self.row), bound.clone());
                    }
                }
                None => values.push(value.to_string()),
            }
        }
        Ok((values, binds))
    }

    /// 当前行各列占位符对应的绑定名
    fn pending_placeholders(&self) -> Vec<&str> {
        self.col_values
            .as_slice()
            .iter()
            .filter_map(|(_, v)| v.strip_prefix(':'))
            .collect()
    }

    fn finish_row(&mut self) -> Result<()> {
        if self.col_values.is_empty() {
            return Ok(());
        }
        let (values, binds) = self.snapshot_row()?;
        let consumed: Vec<String> = self.pending_placeholders().into_iter().map(str::to_string).collect();
        for name in &consumed {
            self.core.bind_values.remove(name);
        }

        match self.bulk_rows.get_mut(self.row) {
            Some(slot) => *slot = values,
            None => self.bulk_rows.push(values),
        }
        self.bulk_binds.merge(binds);
        self.col_values.clear();
        tracing::debug!(row = self.row, cols = self.col_order.len(), "bulk insert row finished");
        Ok(())
    }

    // ========== 自增 ID ==========

    /// `table.col` => 序列名
    pub fn set_last_insert_id_names(&mut self, names: HashMap<String, String>) -> &mut Self {
        self.last_insert_id_names = names;
        self
    }

    /// 查找 `<into>.<col>` 对应的自增序列名
    ///
    /// 未登记时，PostgreSQL 回退到 `<into>_<col>_seq`，其他方言返回 `None`。
    pub fn get_last_insert_id_name(&self, col: &str) -> Option<String> {
        let key = format!("{}.{}", self.into_raw, col);
        if let Some(name) = self.last_insert_id_names.get(&key) {
            return Some(name.clone());
        }
        if self.core.policy.sequence_fallback {
            return Some(format!("{}_{}_seq", self.into_raw, col));
        }
        None
    }

    // ========== 方言修饰符 ==========

    /// MySQL: `HIGH_PRIORITY`
    pub fn high_priority(&mut self, enable: bool) -> &mut Self {
        self.core.dialect_flag("HIGH_PRIORITY", enable);
        self
    }

    /// MySQL: `LOW_PRIORITY`
    pub fn low_priority(&mut self, enable: bool) -> &mut Self {
        self.core.dialect_flag("LOW_PRIORITY", enable);
        self
    }

    /// MySQL: `IGNORE`
    pub fn ignore(&mut self, enable: bool) -> &mut Self {
        self.core.dialect_flag("IGNORE", enable);
        self
    }

    /// MySQL: `DELAYED`
    pub fn delayed(&mut self, enable: bool) -> &mut Self {
        self.core.dialect_flag("DELAYED", enable);
        self
    }

    /// SQLite: `OR ABORT`
    pub fn or_abort(&mut self, enable: bool) -> &mut Self {
        self.core.dialect_flag("OR ABORT", enable);
        self
    }

    /// SQLite: `OR FAIL`
    pub fn or_fail(&mut self, enable: bool) -> &mut Self {
        self.core.dialect_flag("OR FAIL", enable);
        self
    }

    /// SQLite: `OR IGNORE`
    pub fn or_ignore(&mut self, enable: bool) -> &mut Self {
        self.core.dialect_flag("OR IGNORE", enable);
        self
    }

    /// SQLite: `OR ROLLBACK`
    pub fn or_rollback(&mut self, enable: bool) -> &mut Self {
        self.core.dialect_flag("OR ROLLBACK", enable);
        self
    }

    /// MySQL 改用 `REPLACE` 语句；SQLite 加 `OR REPLACE` 修饰符
    pub fn or_replace(&mut self, enable: bool) -> &mut Self {
        match self.core.policy.replace {
            Replace::Keyword => self.use_replace = enable,
            Replace::OrReplaceFlag => self.core.dialect_flag("OR REPLACE", enable),
            Replace::Unsupported => self.core.unsupported("REPLACE"),
        }
        self
    }

    // ========== ON DUPLICATE KEY UPDATE (MySQL) ==========

    fn on_duplicate_supported(&self) -> bool {
        if !self.core.policy.on_duplicate_key {
            self.core.unsupported("ON DUPLICATE KEY UPDATE");
            return false;
        }
        true
    }

    fn add_on_duplicate(&mut self, col: &str, value: Option<BindValue>) {
        let key = self.core.quoter().quote_name(col);
        let bind = format!("{}__on_duplicate_key", col);
        self.on_duplicate.put(key, format!(":{}", bind));
        if let Some(value) = value {
            self.core.bind_value(bind, value);
        }
    }

    /// 更新值为 `:<col>__on_duplicate_key` 占位符
    pub fn on_duplicate_key_update_col(&mut self, col: &str) -> &mut Self {
        if self.on_duplicate_supported() {
            self.add_on_duplicate(col, None);
        }
        self
    }

    /// 同上，并绑定 `value`
    pub fn on_duplicate_key_update_col_value(&mut self, col: &str, value: impl Into<BindValue>) -> &mut Self {
        if self.on_duplicate_supported() {
            self.add_on_duplicate(col, Some(value.into()));
        }
        self
    }

    pub fn on_duplicate_key_update_cols<I, S>(&mut self, cols: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for col in cols {
            self.on_duplicate_key_update_col(col.as_ref());
        }
        self
    }

    pub fn on_duplicate_key_update_cols_values<I, K, V>(&mut self, pairs: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<BindValue>,
    {
        for (col, value) in pairs {
            self.on_duplicate_key_update_col_value(col.as_ref(), value);
        }
        self
    }

    /// 更新值直接使用表达式；`None` 写入 `NULL`
    pub fn on_duplicate_key_update(&mut self, col: &str, expr: Option<&str>) -> &mut Self {
        if self.on_duplicate_supported() {
            self.core.set_col(&mut self.on_duplicate, col, expr);
        }
        self
    }

    // ========== 渲染 ==========

    fn build(&self) -> Result<String> {
        let mut stm = String::from("INSERT");
        stm.push_str(&builder::build_flags(&self.core.flags));
        stm.push_str(&self.builder.build_into(&self.into));

        if self.row > 0 {
            let mut rows = self.bulk_rows.clone();
            if !self.col_values.is_empty() {
                let (values, _) = self.snapshot_row()?;
                rows.truncate(self.row);
                rows.push(values);
            }
            stm.push_str(&self.builder.build_values_for_bulk_insert(&self.col_order, &rows));
        } else {
            stm.push_str(&self.builder.build_values_for_insert(self.col_values.as_slice()));
        }

        let mut stm = self.builder.apply_replace(stm, self.use_replace);
        stm.push_str(&self.builder.build_values_for_update_on_duplicate_key(self.on_duplicate.as_slice()));
        stm.push_str(&builder::build_returning(&self.returning));
        Ok(stm)
    }
}

impl Statement for Insert {
    fn core(&self) -> &QueryCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut QueryCore {
        &mut self.core
    }

    fn statement(&self) -> Result<String> {
        self.build()
    }

    /// 批量插入时包含各行改名后的绑定；未收尾的当前行按收尾后的样子计算
    fn get_bind_values(&self) -> BindMap {
        if self.row == 0 || self.col_values.is_empty() {
            let mut binds = self.core.bind_values.clone();
            binds.merge(self.bulk_binds.clone());
            return binds;
        }

        let pending = self.pending_placeholders();
        let mut binds: BindMap = self
            .core
            .bind_values
            .iter()
            .filter(|(name, _)| !pending.contains(name))
            .map(|(name, value)| (name, value.clone()))
            .collect();
        binds.merge(self.bulk_binds.clone());
        if let Ok((_, row_binds)) = self.snapshot_row() {
            binds.merge(row_binds);
        }
        binds
    }
}

impl HasReturning for Insert {
    fn returning_list(&mut self) -> &mut Vec<String> {
        &mut self.returning
    }
}
