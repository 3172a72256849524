//! 各语句共享的状态
//!
//! `QueryCore` 持有方言策略、绑定值与修饰符；`LimitOffset` 保存行数限制与分页。
//! 具体语句（Select / Insert / Update / Delete）以组合的方式持有这些结构。

use crate::dialect::{Dialect, DialectPolicy, StatementKind};
use crate::quoter::Quoter;
use crate::value::{BindMap, BindValue};

/// 有序的修饰符集合（如 `DISTINCT`、`LOW_PRIORITY`），重复设置会合并
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flags(Vec<String>);

impl Flags {
    pub fn set(&mut self, flag: &str, enable: bool) {
        let pos = self.0.iter().position(|f| f == flag);
        match (enable, pos) {
            (true, None) => self.0.push(flag.to_string()),
            (false, Some(i)) => {
                self.0.remove(i);
            }
            _ => {}
        }
    }

    pub fn has(&self, flag: &str) -> bool {
        self.0.iter().any(|f| f == flag)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// INSERT / UPDATE 的列值，键为已引用的列名，值为占位符或表达式
///
/// 对同一列再次赋值时原地覆盖，保留列的原有位置。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColValues(Vec<(String, String)>);

impl ColValues {
    pub fn get(&self, col: &str) -> Option<&str> {
        self.0.iter().find(|(c, _)| c == col).map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[(String, String)] {
        &self.0
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(c, _)| c.as_str())
    }

    pub(crate) fn put(&mut self, col: String, value: String) {
        match self.0.iter_mut().find(|(c, _)| *c == col) {
            Some(slot) => slot.1 = value,
            None => self.0.push((col, value)),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }
}

#[doc(hidden)]
#[derive(Debug, Clone)]
pub struct QueryCore {
    pub(crate) policy: &'static DialectPolicy,
    pub(crate) kind: StatementKind,
    pub(crate) bind_values: BindMap,
    pub(crate) flags: Flags,
}

impl QueryCore {
    pub(crate) fn new(dialect: Dialect, kind: StatementKind) -> Self {
        Self {
            policy: dialect.policy(),
            kind,
            bind_values: BindMap::new(),
            flags: Flags::default(),
        }
    }

    pub(crate) fn dialect(&self) -> Dialect {
        self.policy.dialect
    }

    pub(crate) fn quoter(&self) -> Quoter {
        self.policy.quoter
    }

    pub(crate) fn bind_value(&mut self, name: impl Into<String>, value: impl Into<BindValue>) {
        self.bind_values.insert(name, value);
    }

    /// 列值设为 `:col` 占位符，给出值时同时绑定
    pub(crate) fn add_col(&mut self, values: &mut ColValues, col: &str, value: Option<BindValue>) {
        let key = self.quoter().quote_name(col);
        values.put(key, format!(":{}", col));
        if let Some(value) = value {
            self.bind_value(col, value);
        }
    }

    /// 列值直接设为表达式（`None` 即 `NULL`），表达式中的限定名会被引用
    pub(crate) fn set_col(&self, values: &mut ColValues, col: &str, expr: Option<&str>) {
        let quoter = self.quoter();
        let key = quoter.quote_name(col);
        values.put(key, quoter.quote_names_in(expr.unwrap_or("NULL")));
    }

    /// 设置方言专属修饰符；当前方言未定义该修饰符时忽略并记录警告
    pub(crate) fn dialect_flag(&mut self, flag: &'static str, enable: bool) {
        if self.policy.allows_flag(self.kind, flag) {
            self.flags.set(flag, enable);
        } else {
            tracing::warn!(
                dialect = %self.dialect(),
                statement = ?self.kind,
                flag,
                "modifier is not supported by this dialect, ignored"
            );
        }
    }

    /// 记录被忽略的方言专属子句
    pub(crate) fn unsupported(&self, clause: &'static str) {
        tracing::warn!(
            dialect = %self.dialect(),
            statement = ?self.kind,
            clause,
            "clause is not supported by this dialect, ignored"
        );
    }
}

/// 行数限制、偏移与分页
///
/// `page` 不为 0 时 `limit` / `offset` 由 `page × paging` 推算；
/// 直接设置 `limit` 或 `offset` 会清除分页。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitOffset {
    limit: u64,
    offset: u64,
    page: u64,
    paging: u64,
}

impl Default for LimitOffset {
    fn default() -> Self {
        Self {
            limit: 0,
            offset: 0,
            page: 0,
            paging: 10,
        }
    }
}

impl LimitOffset {
    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn paging(&self) -> u64 {
        self.paging
    }

    pub fn set_limit(&mut self, limit: u64) {
        self.limit = limit;
        if self.page != 0 {
            self.page = 0;
            self.offset = 0;
        }
    }

    pub fn set_offset(&mut self, offset: u64) {
        self.offset = offset;
        if self.page != 0 {
            self.page = 0;
            self.limit = 0;
        }
    }

    pub fn set_page(&mut self, page: u64) {
        self.page = page;
        self.apply_paging();
    }

    pub fn set_paging(&mut self, paging: u64) {
        self.paging = paging;
        if self.page != 0 {
            self.apply_paging();
        }
    }

    pub fn reset(&mut self) {
        self.limit = 0;
        self.offset = 0;
        self.page = 0;
    }

    fn apply_paging(&mut self) {
        self.limit = 0;
        self.offset = 0;
        if self.page != 0 {
            self.limit = self.paging;
            self.offset = self.paging.saturating_mul(self.page - 1);
        }
    }
}
