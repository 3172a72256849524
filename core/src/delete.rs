//! DELETE 语句

use crate::builder::{self, DeleteBuilder};
use crate::condition::{ClauseMut, Conditions};
use crate::dialect::{Dialect, DmlLimit, StatementKind};
use crate::error::Result;
use crate::query::{LimitOffset, QueryCore};
use crate::traits::{HasLimit, HasLimitOffset, HasOrderBy, HasReturning, HasWhere, Statement};

/// DELETE 语句
#[derive(Debug, Clone)]
pub struct Delete {
    core: QueryCore,
    builder: DeleteBuilder,
    from: String,
    where_: Conditions,
    order_by: Vec<String>,
    limit: LimitOffset,
    returning: Vec<String>,
}

impl Delete {
    pub fn new(dialect: Dialect) -> Self {
        Self::with_builder(dialect, DeleteBuilder::new(dialect.policy()))
    }

    pub(crate) fn with_builder(dialect: Dialect, builder: DeleteBuilder) -> Self {
        Self {
            core: QueryCore::new(dialect, StatementKind::Delete),
            builder,
            from: String::new(),
            where_: Conditions::default(),
            order_by: Vec::new(),
            limit: LimitOffset::default(),
            returning: Vec::new(),
        }
    }

    pub fn from(&mut self, table: &str) -> &mut Self {
        self.from = self.core.quoter().quote_name(table);
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

    /// MySQL: `QUICK`
    pub fn quick(&mut self, enable: bool) -> &mut Self {
        self.core.dialect_flag("QUICK", enable);
        self
    }
}

impl Statement for Delete {
    fn core(&self) -> &QueryCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut QueryCore {
        &mut self.core
    }

    fn statement(&self) -> Result<String> {
        let mut stm = String::from("DELETE");
        stm.push_str(&builder::build_flags(&self.core.flags));
        stm.push_str(&self.builder.build_from(&self.from));
        stm.push_str(&builder::build_where(&self.where_));
        stm.push_str(&builder::build_order_by(&self.order_by));
        stm.push_str(&self.builder.build_limit(&self.limit));
        stm.push_str(&builder::build_returning(&self.returning));
        Ok(stm)
    }
}

impl HasWhere for Delete {
    fn where_clause(&mut self) -> ClauseMut<'_> {
        ClauseMut::new(&mut self.where_, &mut self.core)
    }
}

impl HasOrderBy for Delete {
    fn order_by_list(&mut self) -> &mut Vec<String> {
        &mut self.order_by
    }

    fn supports_order_by(&self) -> bool {
        self.core.policy.delete_limit.allows_order_by()
    }
}

impl HasLimit for Delete {
    fn limit_state(&self) -> &LimitOffset {
        &self.limit
    }

    fn limit_state_mut(&mut self) -> &mut LimitOffset {
        &mut self.limit
    }

    fn limit_support(&self) -> DmlLimit {
        self.core.policy.delete_limit
    }
}

impl HasLimitOffset for Delete {}

impl HasReturning for Delete {
    fn returning_list(&mut self) -> &mut Vec<String> {
        &mut self.returning
    }
}
