//! 语句能力 trait
//!
//! 所有语句都实现 [`Statement`]；按需再实现 [`HasWhere`]、[`HasOrderBy`]、
//! [`HasLimit`]、[`HasLimitOffset`]、[`HasReturning`]。各 trait 通过隐藏的
//! 访问器拿到内部状态，方法体只写一次。

use crate::condition::{add_group, ClauseMut, Connective};
use crate::dialect::{Dialect, DmlLimit};
use crate::error::Result;
use crate::positional::{to_positional, PreparedQuery};
use crate::query::{LimitOffset, QueryCore};
use crate::value::{BindMap, BindValue, Binds};

/// 可渲染为 SQL 并携带绑定值的语句
pub trait Statement {
    #[doc(hidden)]
    fn core(&self) -> &QueryCore;

    #[doc(hidden)]
    fn core_mut(&mut self) -> &mut QueryCore;

    /// 渲染完整语句；渲染不修改任何状态，可重复调用
    fn statement(&self) -> Result<String>;

    /// 当前所有绑定值（按绑定顺序）
    fn get_bind_values(&self) -> BindMap {
        self.core().bind_values.clone()
    }

    fn dialect(&self) -> Dialect {
        self.core().dialect()
    }

    fn bind_value(&mut self, name: &str, value: impl Into<BindValue>) -> &mut Self
    where
        Self: Sized,
    {
        self.core_mut().bind_value(name, value);
        self
    }

    fn bind_values<I, K, V>(&mut self, values: I) -> &mut Self
    where
        Self: Sized,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<BindValue>,
    {
        for (name, value) in values {
            self.core_mut().bind_value(name, value);
        }
        self
    }

    fn reset_bind_values(&mut self) -> &mut Self
    where
        Self: Sized,
    {
        self.core_mut().bind_values.clear();
        self
    }

    fn has_flag(&self, flag: &str) -> bool {
        self.core().flags.has(flag)
    }

    fn reset_flags(&mut self) -> &mut Self
    where
        Self: Sized,
    {
        self.core_mut().flags.clear();
        self
    }

    fn quote_name_prefix(&self) -> &'static str {
        self.core().quoter().prefix()
    }

    fn quote_name_suffix(&self) -> &'static str {
        self.core().quoter().suffix()
    }

    /// 渲染并转换为驱动使用的位置参数形式
    fn prepare(&self) -> Result<PreparedQuery> {
        let sql = self.statement()?;
        to_positional(&sql, &self.get_bind_values(), self.dialect())
    }
}

/// WHERE 子句
pub trait HasWhere: Statement + Sized {
    #[doc(hidden)]
    fn where_clause(&mut self) -> ClauseMut<'_>;

    /// 追加 AND 条件
    fn and_where(&mut self, cond: &str) -> &mut Self {
        self.where_clause().add(Connective::And, cond);
        self
    }

    /// 追加 OR 条件
    fn or_where(&mut self, cond: &str) -> &mut Self {
        self.where_clause().add(Connective::Or, cond);
        self
    }

    /// 追加带绑定值的 AND 条件，绑定中的 `Select` 会以子查询文本替换 `:name`
    fn and_where_bind(&mut self, cond: &str, binds: Binds) -> Result<&mut Self> {
        self.where_clause().add_with_binds(Connective::And, cond, binds)?;
        Ok(self)
    }

    fn or_where_bind(&mut self, cond: &str, binds: Binds) -> Result<&mut Self> {
        self.where_clause().add_with_binds(Connective::Or, cond, binds)?;
        Ok(self)
    }

    /// 括号分组的 AND 条件
    ///
    /// ```
    /// use sqlquery::{HasWhere, QueryFactory};
    ///
    /// let factory = QueryFactory::new("sqlite");
    /// let mut delete = factory.new_delete();
    /// delete.from("t").and_where("a = 1");
    /// delete
    ///     .or_where_group(|q| {
    ///         q.and_where("b = 2").and_where("c = 3");
    ///         Ok(())
    ///     })
    ///     .unwrap();
    /// ```
    fn and_where_group<F>(&mut self, f: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        add_group(self, Self::where_clause, Connective::And, f)?;
        Ok(self)
    }

    fn or_where_group<F>(&mut self, f: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        add_group(self, Self::where_clause, Connective::Or, f)?;
        Ok(self)
    }

    fn reset_where(&mut self) -> &mut Self {
        self.where_clause().conditions.clear();
        self
    }
}

/// ORDER BY 子句
pub trait HasOrderBy: Statement + Sized {
    #[doc(hidden)]
    fn order_by_list(&mut self) -> &mut Vec<String>;

    #[doc(hidden)]
    fn supports_order_by(&self) -> bool {
        true
    }

    fn order_by<I, S>(&mut self, spec: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if !self.supports_order_by() {
            self.core().unsupported("ORDER BY");
            return self;
        }
        let quoter = self.core().quoter();
        let list = self.order_by_list();
        for col in spec {
            list.push(quoter.quote_names_in(col.as_ref()));
        }
        self
    }

    fn reset_order_by(&mut self) -> &mut Self {
        self.order_by_list().clear();
        self
    }
}

/// LIMIT
pub trait HasLimit: Statement + Sized {
    #[doc(hidden)]
    fn limit_state(&self) -> &LimitOffset;

    #[doc(hidden)]
    fn limit_state_mut(&mut self) -> &mut LimitOffset;

    #[doc(hidden)]
    fn limit_support(&self) -> DmlLimit {
        DmlLimit::LimitOffset
    }

    fn limit(&mut self, limit: u64) -> &mut Self {
        if !self.limit_support().allows_limit() {
            self.core().unsupported("LIMIT");
            return self;
        }
        self.limit_state_mut().set_limit(limit);
        self
    }

    fn get_limit(&self) -> u64 {
        self.limit_state().limit()
    }
}

/// LIMIT ... OFFSET
pub trait HasLimitOffset: HasLimit {
    fn offset(&mut self, offset: u64) -> &mut Self {
        if !self.limit_support().allows_offset() {
            self.core().unsupported("OFFSET");
            return self;
        }
        self.limit_state_mut().set_offset(offset);
        self
    }

    fn get_offset(&self) -> u64 {
        self.limit_state().offset()
    }
}

/// RETURNING 子句
pub trait HasReturning: Statement + Sized {
    #[doc(hidden)]
    fn returning_list(&mut self) -> &mut Vec<String>;

    fn returning<I, S>(&mut self, cols: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if !self.core().policy.returning {
            self.core().unsupported("RETURNING");
            return self;
        }
        let quoter = self.core().quoter();
        let list = self.returning_list();
        for col in cols {
            list.push(quoter.quote_names_in(col.as_ref()));
        }
        self
    }
}
