//! 条件列表与条件重写
//!
//! WHERE / HAVING 中的每个元素都是预先渲染好的片段，除第一个外都带有
//! 连接词（AND / OR）前缀。带绑定的条件在加入列表前先经过重写：普通值
//! 直接绑定，子查询则渲染为文本替换进条件，并合并其绑定值。

use crate::error::Result;
use crate::query::QueryCore;
use crate::traits::Statement;
use crate::value::{Bind, BindMap, Binds};

/// 条件连接词
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    And,
    Or,
}

impl Connective {
    pub fn as_str(&self) -> &'static str {
        match self {
            Connective::And => "AND",
            Connective::Or => "OR",
        }
    }
}

/// 有序的条件片段列表
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conditions(Vec<String>);

impl Conditions {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub(crate) fn push(&mut self, andor: Connective, cond: String) {
        if self.0.is_empty() {
            self.0.push(cond);
        } else {
            self.0.push(format!("{} {}", andor.as_str(), cond));
        }
    }

    pub(crate) fn take(&mut self) -> Vec<String> {
        std::mem::take(&mut self.0)
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }

    /// 把分组回调新增的条件以括号包裹后接回原列表；没有新增时原样恢复
    pub(crate) fn splice_group(&mut self, mut saved: Vec<String>, added: Vec<String>, andor: Connective) {
        if added.is_empty() {
            self.0 = saved;
            return;
        }
        if saved.is_empty() {
            saved.push("(".to_string());
        } else {
            saved.push(format!("{} (", andor.as_str()));
        }
        saved.extend(added.into_iter().map(|cond| format!("    {}", cond)));
        saved.push(")".to_string());
        self.0 = saved;
    }
}

/// 某个条件子句及其所属语句状态的可变视图
#[doc(hidden)]
pub struct ClauseMut<'a> {
    pub(crate) conditions: &'a mut Conditions,
    pub(crate) core: &'a mut QueryCore,
}

impl<'a> ClauseMut<'a> {
    pub fn new(conditions: &'a mut Conditions, core: &'a mut QueryCore) -> Self {
        Self { conditions, core }
    }

    pub(crate) fn add(self, andor: Connective, cond: &str) {
        let cond = self.core.quoter().quote_names_in(cond);
        self.conditions.push(andor, cond);
    }

    pub(crate) fn add_with_binds(self, andor: Connective, cond: &str, binds: Binds) -> Result<()> {
        let cond = self.core.quoter().quote_names_in(cond);
        let cond = rebuild_cond_and_bind_values(&cond, binds, &mut self.core.bind_values)?;
        self.conditions.push(andor, cond);
        Ok(())
    }
}

/// 分组条件：回调在一个临时清空的列表上工作，完成后以括号形式接回
pub(crate) fn add_group<Q, A, F>(query: &mut Q, access: A, andor: Connective, f: F) -> Result<()>
where
    A: Fn(&mut Q) -> ClauseMut<'_>,
    F: FnOnce(&mut Q) -> Result<()>,
{
    let saved = access(query).conditions.take();
    let outcome = f(query);
    let clause = access(query);
    let added = clause.conditions.take();
    clause.conditions.splice_group(saved, added, andor);
    outcome
}

/// 绑定条件中的值，并把 `:name` 形式的子查询占位符替换为子查询语句
///
/// 先绑定普通值，再按顺序合并各子查询的绑定值。子查询渲染失败时不修改任何状态。
pub(crate) fn rebuild_cond_and_bind_values(
    cond: &str,
    binds: Binds,
    bind_values: &mut BindMap,
) -> Result<String> {
    let mut values = Vec::new();
    let mut selects = Vec::new();
    for (name, bind) in binds {
        match bind {
            Bind::Value(value) => values.push((name, value)),
            Bind::Select(select) => {
                let statement = select.statement()?;
                selects.push((format!(":{}", name), statement, select.get_bind_values()));
            }
        }
    }

    for (name, value) in values {
        bind_values.insert(name, value);
    }
    if selects.is_empty() {
        return Ok(cond.to_string());
    }

    let mut replacements = Vec::with_capacity(selects.len());
    for (token, statement, sub_binds) in selects {
        bind_values.merge(sub_binds);
        replacements.push((token, statement));
    }
    Ok(replace_tokens(cond, &replacements))
}

/// 单次从左到右替换，同一位置优先匹配最长的键，替换结果不会再次参与匹配
pub(crate) fn replace_tokens(text: &str, pairs: &[(String, String)]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while !rest.is_empty() {
        let hit = pairs
            .iter()
            .filter(|(from, _)| !from.is_empty() && rest.starts_with(from.as_str()))
            .max_by_key(|(from, _)| from.len());
        match hit {
            Some((from, to)) => {
                out.push_str(to);
                rest = &rest[from.len()..];
            }
            None => {
                let ch_len = rest.chars().next().map_or(1, char::len_utf8);
                out.push_str(&rest[..ch_len]);
                rest = &rest[ch_len..];
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::BindValue;

    #[test]
    fn test_push_prefixes_connective() {
        let mut c = Conditions::default();
        c.push(Connective::And, "a = 1".into());
        c.push(Connective::Or, "b = 2".into());
        assert_eq!(c.as_slice(), ["a = 1", "OR b = 2"]);
    }

    #[test]
    fn test_splice_group() {
        let mut c = Conditions::default();
        c.splice_group(vec!["a = 1".into()], vec!["b = 2".into(), "OR c = 3".into()], Connective::And);
        assert_eq!(c.as_slice(), ["a = 1", "AND (", "    b = 2", "    OR c = 3", ")"]);

        let mut c = Conditions::default();
        c.splice_group(vec![], vec!["b = 2".into()], Connective::Or);
        assert_eq!(c.as_slice(), ["(", "    b = 2", ")"]);

        let mut c = Conditions::default();
        c.splice_group(vec!["a = 1".into()], vec![], Connective::Or);
        assert_eq!(c.as_slice(), ["a = 1"]);
    }

    #[test]
    fn test_replace_tokens_prefers_longest() {
        let pairs = vec![
            (":a".to_string(), "X".to_string()),
            (":ab".to_string(), "Y".to_string()),
        ];
        assert_eq!(replace_tokens("(:ab, :a, :ac)", &pairs), "(Y, X, Xc)");
    }

    #[test]
    fn test_replace_tokens_single_pass() {
        let pairs = vec![(":a".to_string(), ":a:a".to_string())];
        assert_eq!(replace_tokens(":a", &pairs), ":a:a");
    }

    #[test]
    fn test_rebuild_binds_plain_values() {
        let mut binds = BindMap::new();
        let cond = rebuild_cond_and_bind_values(
            "foo = :foo",
            crate::binds! { "foo" => "bar" },
            &mut binds,
        )
        .unwrap();
        assert_eq!(cond, "foo = :foo");
        assert_eq!(binds.get("foo"), Some(&BindValue::from("bar")));
    }
}
