//! SELECT 语句

use crate::builder::{self, FromSlot, SelectBuilder};
use crate::condition::{add_group, rebuild_cond_and_bind_values, ClauseMut, Conditions, Connective};
use crate::dialect::{Dialect, StatementKind};
use crate::error::{Result, SqlQueryError};
use crate::query::{LimitOffset, QueryCore};
use crate::quoter::{rfind_ignore_case, starts_with_ignore_case, Quoter};
use crate::traits::{HasLimit, HasLimitOffset, HasOrderBy, HasWhere, Statement};
use crate::value::{BindMap, Binds};

const FROM_SUB_SELECT_INDENT: &str = "        ";
const JOIN_SUB_SELECT_INDENT: &str = "            ";

/// 列的键：未起别名的列按位置编号，起了别名的列以别名为键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColKey {
    Index(usize),
    Alias(String),
}

/// 子查询来源：原始 SQL 文本，或另一个 `Select`（其绑定值会被合并）
#[derive(Debug, Clone)]
pub enum SubSelect {
    Raw(String),
    Select(Box<Select>),
}

impl From<&str> for SubSelect {
    fn from(sql: &str) -> Self {
        SubSelect::Raw(sql.to_string())
    }
}

impl From<String> for SubSelect {
    fn from(sql: String) -> Self {
        SubSelect::Raw(sql)
    }
}

impl From<Select> for SubSelect {
    fn from(select: Select) -> Self {
        SubSelect::Select(Box::new(select))
    }
}

/// SELECT 语句
///
/// ```
/// use sqlquery::{HasWhere, QueryFactory, Statement};
///
/// let factory = QueryFactory::new("mysql");
/// let mut select = factory.new_select();
/// select.cols(["id", "name AS n"]).from("users u").unwrap();
/// select.and_where("u.id > 10");
/// assert_eq!(
///     select.statement().unwrap(),
///     "SELECT\n    id,\n    name AS `n`\nFROM\n    `users` `u`\nWHERE\n    `u`.`id` > 10"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Select {
    core: QueryCore,
    builder: SelectBuilder,
    unions: Vec<String>,
    for_update: bool,
    cols: Vec<(ColKey, String)>,
    next_col_index: usize,
    from: Vec<String>,
    joins: Vec<Vec<String>>,
    table_refs: Vec<(String, String)>,
    where_: Conditions,
    group_by: Vec<String>,
    having: Conditions,
    order_by: Vec<String>,
    limit: LimitOffset,
}

impl Select {
    pub fn new(dialect: Dialect) -> Self {
        Self::with_builder(dialect, SelectBuilder::new(dialect.policy()))
    }

    pub(crate) fn with_builder(dialect: Dialect, builder: SelectBuilder) -> Self {
        Self {
            core: QueryCore::new(dialect, StatementKind::Select),
            builder,
            unions: Vec::new(),
            for_update: false,
            cols: Vec::new(),
            next_col_index: 0,
            from: Vec::new(),
            joins: Vec::new(),
            table_refs: Vec::new(),
            where_: Conditions::default(),
            group_by: Vec::new(),
            having: Conditions::default(),
            order_by: Vec::new(),
            limit: LimitOffset::default(),
        }
    }

    fn quoter(&self) -> Quoter {
        self.core.quoter()
    }

    // ========== 修饰符 ==========

    pub fn distinct(&mut self, enable: bool) -> &mut Self {
        self.core.flags.set("DISTINCT", enable);
        self
    }

    pub fn is_distinct(&self) -> bool {
        self.core.flags.has("DISTINCT")
    }

    pub fn for_update(&mut self, enable: bool) -> &mut Self {
        self.for_update = enable;
        self
    }

    /// MySQL: `SQL_CALC_FOUND_ROWS`
    pub fn calc_found_rows(&mut self, enable: bool) -> &mut Self {
        self.core.dialect_flag("SQL_CALC_FOUND_ROWS", enable);
        self
    }

    /// MySQL: `SQL_CACHE`
    pub fn cache(&mut self, enable: bool) -> &mut Self {
        self.core.dialect_flag("SQL_CACHE", enable);
        self
    }

    /// MySQL: `SQL_NO_CACHE`
    pub fn no_cache(&mut self, enable: bool) -> &mut Self {
        self.core.dialect_flag("SQL_NO_CACHE", enable);
        self
    }

    /// MySQL: `STRAIGHT_JOIN`
    pub fn straight_join(&mut self, enable: bool) -> &mut Self {
        self.core.dialect_flag("STRAIGHT_JOIN", enable);
        self
    }

    /// MySQL: `HIGH_PRIORITY`
    pub fn high_priority(&mut self, enable: bool) -> &mut Self {
        self.core.dialect_flag("HIGH_PRIORITY", enable);
        self
    }

    /// MySQL: `SQL_SMALL_RESULT`
    pub fn small_result(&mut self, enable: bool) -> &mut Self {
        self.core.dialect_flag("SQL_SMALL_RESULT", enable);
        self
    }

    /// MySQL: `SQL_BIG_RESULT`
    pub fn big_result(&mut self, enable: bool) -> &mut Self {
        self.core.dialect_flag("SQL_BIG_RESULT", enable);
        self
    }

    /// MySQL: `SQL_BUFFER_RESULT`
    pub fn buffer_result(&mut self, enable: bool) -> &mut Self {
        self.core.dialect_flag("SQL_BUFFER_RESULT", enable);
        self
    }

    // ========== 列 ==========

    /// 追加列说明
    ///
    /// `"expr alias"` 与 `"expr AS alias"` 会解析出别名；其他形式原样保存。
    /// 已存在的别名会被原地覆盖。
    pub fn cols<I, S>(&mut self, cols: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for spec in cols {
            self.add_col_with_alias(spec.as_ref());
        }
        self
    }

    /// 追加一个带别名的列：`expr AS alias`
    pub fn col_as(&mut self, expr: &str, alias: &str) -> &mut Self {
        self.set_col(ColKey::Alias(alias.to_string()), expr.to_string());
        self
    }

    /// 批量追加 `(expr, alias)`
    pub fn cols_as<I, E, A>(&mut self, cols: I) -> &mut Self
    where
        I: IntoIterator<Item = (E, A)>,
        E: AsRef<str>,
        A: AsRef<str>,
    {
        for (expr, alias) in cols {
            self.col_as(expr.as_ref(), alias.as_ref());
        }
        self
    }

    fn add_col_with_alias(&mut self, spec: &str) {
        let parts: Vec<&str> = spec.split(' ').collect();
        match parts.as_slice() {
            [expr, alias] => self.set_col(ColKey::Alias(alias.to_string()), expr.to_string()),
            [expr, keyword, alias] if keyword.eq_ignore_ascii_case("AS") => {
                self.set_col(ColKey::Alias(alias.to_string()), expr.to_string())
            }
            _ => {
                let key = ColKey::Index(self.next_col_index);
                self.next_col_index += 1;
                self.cols.push((key, spec.to_string()));
            }
        }
    }

    fn set_col(&mut self, key: ColKey, expr: String) {
        match self.cols.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = expr,
            None => self.cols.push((key, expr)),
        }
    }

    /// 按别名移除列；没有该别名时移除第一个表达式相同的未命名列
    pub fn remove_col(&mut self, alias: &str) -> bool {
        let by_alias = self
            .cols
            .iter()
            .position(|(k, _)| matches!(k, ColKey::Alias(a) if a == alias));
        let index = by_alias.or_else(|| {
            self.cols
                .iter()
                .position(|(k, v)| matches!(k, ColKey::Index(_)) && v == alias)
        });
        match index {
            Some(i) => {
                self.cols.remove(i);
                true
            }
            None => false,
        }
    }

    /// 别名或任一列表达式与 `name` 相同时返回 true
    pub fn has_col(&self, name: &str) -> bool {
        self.cols
            .iter()
            .any(|(k, v)| matches!(k, ColKey::Alias(a) if a == name) || v == name)
    }

    pub fn has_cols(&self) -> bool {
        !self.cols.is_empty()
    }

    pub fn get_cols(&self) -> &[(ColKey, String)] {
        &self.cols
    }

    // ========== FROM / JOIN ==========

    /// 检查表名或别名是否已被引用，返回登记用的名称与文本
    fn check_table_ref(&self, kind: &str, spec: &str) -> Result<(String, String)> {
        let name = match rfind_ignore_case(spec, " AS ") {
            Some(pos) => spec[pos + 4..].trim().to_string(),
            None => spec.to_string(),
        };
        let reference = format!("{} {}", kind, spec);
        if let Some((_, previous)) = self.table_refs.iter().find(|(n, _)| *n == name) {
            return Err(SqlQueryError::DuplicateReference {
                reference,
                previous: previous.clone(),
            });
        }
        Ok((name, reference))
    }

    fn add_from(&mut self, spec: String) {
        self.from.push(spec);
    }

    fn add_join(&mut self, spec: String) {
        let slot = self.from.len().saturating_sub(1);
        if self.joins.len() <= slot {
            self.joins.resize_with(slot + 1, Vec::new);
        }
        self.joins[slot].push(spec);
    }

    /// FROM 一个表（名称会被引用）
    pub fn from(&mut self, spec: &str) -> Result<&mut Self> {
        let table_ref = self.check_table_ref("FROM", spec)?;
        self.table_refs.push(table_ref);
        let quoted = self.quoter().quote_name(spec);
        self.add_from(quoted);
        Ok(self)
    }

    /// FROM 原始文本（不做引用）
    pub fn from_raw(&mut self, spec: &str) -> Result<&mut Self> {
        let table_ref = self.check_table_ref("FROM", spec)?;
        self.table_refs.push(table_ref);
        self.add_from(spec.to_string());
        Ok(self)
    }

    /// FROM 子查询：`(...) AS name`
    pub fn from_sub_select(&mut self, spec: impl Into<SubSelect>, name: &str) -> Result<&mut Self> {
        let table_ref = self.check_table_ref("FROM (SELECT ...) AS", name)?;
        let (text, sub_binds) = render_sub_select(spec.into(), FROM_SUB_SELECT_INDENT)?;
        let name = self.quoter().quote_name(name);
        self.core.bind_values.merge(sub_binds);
        self.table_refs.push(table_ref);
        self.add_from(format!("({}    ) AS {}", text, name));
        Ok(self)
    }

    /// JOIN 一个表，`kind` 如 `"LEFT"`、`"inner"`、`"natural"`
    ///
    /// 条件不以 `ON ` 或 `USING ` 开头时自动补 `ON `。
    pub fn join(&mut self, kind: &str, spec: &str, cond: Option<&str>) -> Result<&mut Self> {
        self.join_bind(kind, spec, cond, Binds::new())
    }

    /// 带绑定值的 JOIN
    pub fn join_bind(&mut self, kind: &str, spec: &str, cond: Option<&str>, binds: Binds) -> Result<&mut Self> {
        let join = join_keyword(kind);
        let table_ref = self.check_table_ref(&join, spec)?;
        let quoter = self.quoter();
        let mut bind_values = self.core.bind_values.clone();
        let cond = fix_join_condition(quoter, cond, binds, &mut bind_values)?;

        self.core.bind_values = bind_values;
        self.table_refs.push(table_ref);
        let spec = quoter.quote_name(spec);
        self.add_join(format!("{} {} {}", join, spec, cond).trim_end().to_string());
        Ok(self)
    }

    pub fn inner_join(&mut self, spec: &str, cond: Option<&str>) -> Result<&mut Self> {
        self.join("INNER", spec, cond)
    }

    pub fn left_join(&mut self, spec: &str, cond: Option<&str>) -> Result<&mut Self> {
        self.join("LEFT", spec, cond)
    }

    /// JOIN 子查询：`<kind> JOIN (...) AS name [ON ...]`
    pub fn join_sub_select(
        &mut self,
        kind: &str,
        spec: impl Into<SubSelect>,
        name: &str,
        cond: Option<&str>,
        binds: Binds,
    ) -> Result<&mut Self> {
        let join = join_keyword(kind);
        let table_ref = self.check_table_ref(&format!("{} (SELECT ...) AS", join), name)?;
        let (text, sub_binds) = render_sub_select(spec.into(), JOIN_SUB_SELECT_INDENT)?;
        let quoter = self.quoter();
        let mut bind_values = self.core.bind_values.clone();
        bind_values.merge(sub_binds);
        let cond = fix_join_condition(quoter, cond, binds, &mut bind_values)?;

        self.core.bind_values = bind_values;
        self.table_refs.push(table_ref);
        let name = quoter.quote_name(name);
        let text = format!("{} ({}        ) AS {} {}", join, text, name, cond);
        self.add_join(format!("        {}", text.trim_end()));
        Ok(self)
    }

    // ========== GROUP BY / HAVING ==========

    pub fn group_by<I, S>(&mut self, spec: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let quoter = self.quoter();
        for col in spec {
            self.group_by.push(quoter.quote_names_in(col.as_ref()));
        }
        self
    }

    fn having_clause(&mut self) -> ClauseMut<'_> {
        ClauseMut::new(&mut self.having, &mut self.core)
    }

    pub fn and_having(&mut self, cond: &str) -> &mut Self {
        self.having_clause().add(Connective::And, cond);
        self
    }

    pub fn or_having(&mut self, cond: &str) -> &mut Self {
        self.having_clause().add(Connective::Or, cond);
        self
    }

    pub fn and_having_bind(&mut self, cond: &str, binds: Binds) -> Result<&mut Self> {
        self.having_clause().add_with_binds(Connective::And, cond, binds)?;
        Ok(self)
    }

    pub fn or_having_bind(&mut self, cond: &str, binds: Binds) -> Result<&mut Self> {
        self.having_clause().add_with_binds(Connective::Or, cond, binds)?;
        Ok(self)
    }

    pub fn and_having_group<F>(&mut self, f: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        add_group(self, Self::having_clause, Connective::And, f)?;
        Ok(self)
    }

    pub fn or_having_group<F>(&mut self, f: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        add_group(self, Self::having_clause, Connective::Or, f)?;
        Ok(self)
    }

    // ========== 分页 ==========

    /// 按页设置 LIMIT / OFFSET，页码从 1 开始，0 表示不分页
    pub fn page(&mut self, page: u64) -> &mut Self {
        self.limit.set_page(page);
        self
    }

    pub fn get_page(&self) -> u64 {
        self.limit.page()
    }

    pub fn set_paging(&mut self, paging: u64) -> &mut Self {
        self.limit.set_paging(paging);
        self
    }

    pub fn get_paging(&self) -> u64 {
        self.limit.paging()
    }

    // ========== UNION ==========

    pub fn union(&mut self) -> Result<&mut Self> {
        self.push_union("UNION")
    }

    pub fn union_all(&mut self) -> Result<&mut Self> {
        self.push_union("UNION ALL")
    }

    fn push_union(&mut self, keyword: &str) -> Result<&mut Self> {
        let stm = self.build()?;
        self.unions.push(format!("{}\n{}", stm, keyword));
        tracing::debug!(segments = self.unions.len(), keyword, "select segment stored for union");
        self.reset();
        Ok(self)
    }

    pub fn reset_unions(&mut self) -> &mut Self {
        self.unions.clear();
        self
    }

    // ========== 重置 ==========

    /// 清空当前段的所有子句（不影响已保存的 UNION 段与绑定值）
    pub fn reset(&mut self) -> &mut Self {
        self.core.flags.clear();
        self.reset_cols();
        self.reset_tables();
        self.where_.clear();
        self.group_by.clear();
        self.having.clear();
        self.order_by.clear();
        self.limit.reset();
        self.for_update = false;
        self
    }

    pub fn reset_cols(&mut self) -> &mut Self {
        self.cols.clear();
        self.next_col_index = 0;
        self
    }

    pub fn reset_tables(&mut self) -> &mut Self {
        self.from.clear();
        self.joins.clear();
        self.table_refs.clear();
        self
    }

    pub fn reset_group_by(&mut self) -> &mut Self {
        self.group_by.clear();
        self
    }

    pub fn reset_having(&mut self) -> &mut Self {
        self.having.clear();
        self
    }

    // ========== 渲染 ==========

    fn build(&self) -> Result<String> {
        let quoter = self.quoter();
        let cols: Vec<String> = self
            .cols
            .iter()
            .map(|(key, expr)| match key {
                ColKey::Index(_) => quoter.quote_names_in(expr),
                ColKey::Alias(alias) => quoter.quote_names_in(&format!("{} AS {}", expr, alias)),
            })
            .collect();
        let from: Vec<FromSlot> = self
            .from
            .iter()
            .enumerate()
            .map(|(i, table)| FromSlot {
                table: table.clone(),
                joins: self.joins.get(i).cloned().unwrap_or_default(),
            })
            .collect();

        let mut stm = String::from("SELECT");
        stm.push_str(&builder::build_flags(&self.core.flags));
        stm.push_str(&self.builder.build_cols(&cols)?);
        stm.push_str(&self.builder.build_from(&from));
        stm.push_str(&builder::build_where(&self.where_));
        stm.push_str(&self.builder.build_group_by(&self.group_by));
        stm.push_str(&self.builder.build_having(self.having.as_slice()));
        stm.push_str(&builder::build_order_by(&self.order_by));
        stm.push_str(&self.builder.build_limit_offset(self.limit.limit(), self.limit.offset()));
        stm.push_str(&self.builder.build_for_update(self.for_update));
        Ok(self.builder.apply_limit(stm, self.limit.limit(), self.limit.offset()))
    }
}

fn join_keyword(kind: &str) -> String {
    format!("{} JOIN", kind).trim_start().to_uppercase()
}

/// 渲染子查询并给每一行加缩进，同时返回其绑定值
fn render_sub_select(spec: SubSelect, indent: &str) -> Result<(String, BindMap)> {
    let (sql, binds) = match spec {
        SubSelect::Raw(sql) => (sql, BindMap::new()),
        SubSelect::Select(select) => (select.statement()?, select.get_bind_values()),
    };
    let indented = sql
        .split('\n')
        .map(|line| format!("{}{}", indent, line))
        .collect::<Vec<_>>()
        .join("\n");
    Ok((format!("\n{}{}\n", indent, indented.trim_start()), binds))
}

fn fix_join_condition(
    quoter: Quoter,
    cond: Option<&str>,
    binds: Binds,
    bind_values: &mut BindMap,
) -> Result<String> {
    let cond = match cond {
        Some(c) if !c.is_empty() => c,
        _ => return Ok(String::new()),
    };
    let cond = quoter.quote_names_in(cond);
    let cond = rebuild_cond_and_bind_values(&cond, binds, bind_values)?;
    let head = cond.trim_start();
    if starts_with_ignore_case(head, "ON ") || starts_with_ignore_case(head, "USING ") {
        return Ok(cond);
    }
    Ok(format!("ON {}", cond))
}

impl Statement for Select {
    fn core(&self) -> &QueryCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut QueryCore {
        &mut self.core
    }

    /// 先输出已保存的 UNION 段，再输出当前段
    fn statement(&self) -> Result<String> {
        let current = self.build()?;
        if self.unions.is_empty() {
            return Ok(current);
        }
        Ok(format!("{}\n{}", self.unions.join("\n"), current))
    }
}

impl HasWhere for Select {
    fn where_clause(&mut self) -> ClauseMut<'_> {
        ClauseMut::new(&mut self.where_, &mut self.core)
    }
}

impl HasOrderBy for Select {
    fn order_by_list(&mut self) -> &mut Vec<String> {
        &mut self.order_by
    }
}

impl HasLimit for Select {
    fn limit_state(&self) -> &LimitOffset {
        &self.limit
    }

    fn limit_state_mut(&mut self) -> &mut LimitOffset {
        &mut self.limit
    }
}

impl HasLimitOffset for Select {}
