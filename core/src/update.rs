//! UPDATE 语句

use crate::builder::{self, UpdateBuilder};
use crate::condition::{ClauseMut, Conditions};
use crate::dialect::{Dialect, DmlLimit, StatementKind};
use crate::error::Result;
use crate::query::{ColValues, LimitOffset, QueryCore};
use crate::traits::{HasLimit, HasLimitOffset, HasOrderBy, HasReturning, HasWhere, Statement};
use crate::value::BindValue;

/// UPDATE 语句
#[derive(Debug, Clone)]
pub struct Update {
    core: QueryCore,
    builder: UpdateBuilder,
    table: String,
    col_values: ColValues,
    where_: Conditions,
    order_by: Vec<String>,
    limit: LimitOffset,
    returning: Vec<String>,
}

impl Update {
    pub fn new(dialect: Dialect) -> Self {
        Self::with_builder(dialect, UpdateBuilder::new(dialect.policy()))
    }

    pub(crate) fn with_builder(dialect: Dialect, builder: UpdateBuilder) -> Self {
        Self {
            core: QueryCore::new(dialect, StatementKind::Update),
            builder,
            table: String::new(),
            col_values: ColValues::default(),
            where_: Conditions::default(),
            order_by: Vec::new(),
            limit: LimitOffset::default(),
            returning: Vec::new(),
        }
    }

    pub fn table(&mut self, table: &str) -> &mut Self {
        self.table = self.core.quoter().quote_name(table);
        self
    }

    pub fn col(&mut self, name: &str) -> &mut Self {
        self.core.add_col(&mut self.col_values, name, None);
        self
    }

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

    /// 列值直接使用表达式；`None` 写入 `NULL`
    pub fn set(&mut self, col: &str, expr: Option<&str>) -> &mut Self {
        self.core.set_col(&mut self.col_values, col, expr);
        self
    }

    pub fn has_cols(&self) -> bool {
        !self.col_values.is_empty()
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

    /// SQLite: `OR REPLACE`
    pub fn or_replace(&mut self, enable: bool) -> &mut Self {
        self.core.dialect_flag("OR REPLACE", enable);
        self
    }

    /// SQLite: `OR ROLLBACK`
    pub fn or_rollback(&mut self, enable: bool) -> &mut Self {
        self.core.dialect_flag("OR ROLLBACK", enable);
        self
    }
}

impl Statement for Update {
    fn core(&self) -> &QueryCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut QueryCore {
        &mut self.core
    }

    fn statement(&self) -> Result<String> {
        let mut stm = String::from("UPDATE");
        stm.push_str(&builder::build_flags(&self.core.flags));
        stm.push_str(&self.builder.build_table(&self.table));
        stm.push_str(&self.builder.build_values_for_update(self.col_values.as_slice()));
        stm.push_str(&builder::build_where(&self.where_));
        stm.push_str(&builder::build_order_by(&self.order_by));
        stm.push_str(&self.builder.build_limit(&self.limit));
        stm.push_str(&builder::build_returning(&self.returning));
        Ok(stm)
    }
}

impl HasWhere for Update {
    fn where_clause(&mut self) -> ClauseMut<'_> {
        ClauseMut::new(&mut self.where_, &mut self.core)
    }
}

impl HasOrderBy for Update {
    fn order_by_list(&mut self) -> &mut Vec<String> {
        &mut self.order_by
    }

    fn supports_order_by(&self) -> bool {
        self.core.policy.update_limit.allows_order_by()
    }
}

impl HasLimit for Update {
    fn limit_state(&self) -> &LimitOffset {
        &self.limit
    }

    fn limit_state_mut(&mut self) -> &mut LimitOffset {
        &mut self.limit
    }

    fn limit_support(&self) -> DmlLimit {
        self.core.policy.update_limit
    }
}

impl HasLimitOffset for Update {}

impl HasReturning for Update {
    fn returning_list(&mut self) -> &mut Vec<String> {
        &mut self.returning
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binds;
    use crate::test_utils::assert_same_sql;
    use crate::value::BindMap;

    fn check(update: &Update, expect: &str) {
        assert_same_sql(expect, &update.statement().unwrap(), update.core.quoter());
    }

    fn fill_standard(update: &mut Update) {
        update
            .table("t1")
            .cols(["c1", "c2"])
            .col("c3")
            .set("c4", None)
            .set("c5", Some("NOW()"));
        update
            .and_where_bind("foo = :foo", binds! { "foo" => "bar" })
            .unwrap()
            .and_where_bind("baz = :baz", binds! { "baz" => "dib" })
            .unwrap()
            .or_where("zim = gir");
    }

    fn standard_binds() -> BindMap {
        vec![("foo", "bar"), ("baz", "dib")].into_iter().collect()
    }

    const STANDARD: &str = "
        UPDATE%s <<t1>>
        SET
            <<c1>> = :c1,
            <<c2>> = :c2,
            <<c3>> = :c3,
            <<c4>> = NULL,
            <<c5>> = NOW()
        WHERE
            foo = :foo
            AND baz = :baz
            OR zim = gir";

    #[test]
    fn test_common() {
        let mut update = Update::new(Dialect::Common);
        fill_standard(&mut update);
        check(&update, &STANDARD.replace("%s", ""));
        assert_eq!(update.get_bind_values(), standard_binds());
    }

    #[test]
    fn test_has_cols() {
        let mut update = Update::new(Dialect::Common);
        update.table("t1");
        assert!(!update.has_cols());
        update.cols(["c1", "c2"]);
        assert!(update.has_cols());
    }

    #[test]
    fn test_common_ignores_order_by_and_limit() {
        let mut update = Update::new(Dialect::Common);
        update.table("t1").col("c1");
        update.order_by(["c2"]).limit(10);
        check(&update, "UPDATE <<t1>>\nSET\n<<c1>> = :c1");
        assert_eq!(update.get_limit(), 0);
    }

    #[test]
    fn test_mysql_order_by_limit() {
        let mut update = Update::new(Dialect::MySql);
        update.table("t1").col("c1");
        update.order_by(["c2"]).limit(10);
        check(
            &update,
            "UPDATE <<t1>>
            SET
                <<c1>> = :c1
            ORDER BY
                c2
            LIMIT 10",
        );
        // MySQL 的 UPDATE 不支持 OFFSET
        update.offset(5);
        assert_eq!(update.get_offset(), 0);
    }

    #[test]
    fn test_mysql_flags() {
        for (flag, apply) in [
            ("LOW_PRIORITY", Update::low_priority as fn(&mut Update, bool) -> &mut Update),
            ("IGNORE", Update::ignore),
        ] {
            let mut update = Update::new(Dialect::MySql);
            apply(&mut update, true);
            fill_standard(&mut update);
            update.limit(5);
            let expect = format!("{}\nLIMIT 5", STANDARD.replace("%s", &format!(" {}", flag)));
            check(&update, &expect);
            assert_eq!(update.get_bind_values(), standard_binds());
        }
    }

    #[test]
    fn test_sqlite_order_limit_offset() {
        let mut update = Update::new(Dialect::Sqlite);
        fill_standard(&mut update);
        update.order_by(["zim DESC", "baz ASC"]).limit(5).offset(10);
        let expect = format!(
            "{}\nORDER BY\nzim DESC,\nbaz ASC\nLIMIT 5 OFFSET 10",
            STANDARD.replace("%s", "")
        );
        check(&update, &expect);
        assert_eq!((update.get_limit(), update.get_offset()), (5, 10));
    }

    #[test]
    fn test_sqlite_flags() {
        for (flag, apply) in [
            ("OR ABORT", Update::or_abort as fn(&mut Update, bool) -> &mut Update),
            ("OR FAIL", Update::or_fail),
            ("OR IGNORE", Update::or_ignore),
            ("OR REPLACE", Update::or_replace),
            ("OR ROLLBACK", Update::or_rollback),
        ] {
            let mut update = Update::new(Dialect::Sqlite);
            apply(&mut update, true);
            fill_standard(&mut update);
            update.limit(5);
            let expect = format!("{}\nLIMIT 5", STANDARD.replace("%s", &format!(" {}", flag)));
            check(&update, &expect);
        }
    }

    #[test]
    fn test_flags_ignored_on_other_dialects() {
        let mut update = Update::new(Dialect::Postgres);
        update.low_priority(true).or_abort(true);
        assert!(!update.has_flag("LOW_PRIORITY"));
        assert!(!update.has_flag("OR ABORT"));
    }

    #[test]
    fn test_postgres_returning() {
        let mut update = Update::new(Dialect::Postgres);
        fill_standard(&mut update);
        update.returning(["c1", "c2"]).returning(["c3"]);
        let expect = format!("{}\nRETURNING\nc1,\nc2,\nc3", STANDARD.replace("%s", ""));
        check(&update, &expect);
        assert_eq!(update.get_bind_values(), standard_binds());
    }
}
