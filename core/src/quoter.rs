//! 标识符引用
//!
//! `Quoter` 负责给表名、列名、别名加上方言对应的引用符号，同时保证字符串
//! 字面量中的内容不被改写。

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static QUALIFIED_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([A-Za-z_][A-Za-z0-9_]*)\.([A-Za-z_][A-Za-z0-9_]*)\b")
        .expect("qualified name pattern is valid")
});

/// `quote_name` 依次尝试的分隔符
const SEPARATORS: [&str; 3] = [" AS ", " ", "."];

/// 标识符引用器：前缀和后缀在方言实例内不可变
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quoter {
    prefix: &'static str,
    suffix: &'static str,
}

impl Default for Quoter {
    fn default() -> Self {
        Self::new("\"", "\"")
    }
}

impl Quoter {
    pub const fn new(prefix: &'static str, suffix: &'static str) -> Self {
        Self { prefix, suffix }
    }

    pub fn prefix(&self) -> &'static str {
        self.prefix
    }

    pub fn suffix(&self) -> &'static str {
        self.suffix
    }

    /// 引用单个名称说明，如 `table`、`table.col`、`table AS alias`、`table alias`
    ///
    /// 按 ` AS `、空格、`.` 的顺序查找最右侧（不区分大小写）的分隔符并拆分：
    /// 左侧递归处理，右侧整体作为一个标识符。`*` 永远不会被引用。
    ///
    /// ```
    /// use sqlquery::Quoter;
    ///
    /// let q = Quoter::default();
    /// assert_eq!(q.quote_name("t.col AS c"), r#""t"."col" AS "c""#);
    /// assert_eq!(q.quote_name("t.*"), r#""t".*"#);
    /// ```
    pub fn quote_name(&self, spec: &str) -> String {
        let spec = spec.trim();
        for sep in SEPARATORS {
            match rfind_ignore_case(spec, sep) {
                Some(pos) if pos > 0 => {
                    let left = self.quote_name(&spec[..pos]);
                    let right = self.replace_name(&spec[pos + sep.len()..]);
                    return format!("{}{}{}", left, sep, right);
                }
                _ => {}
            }
        }
        self.replace_name(spec)
    }

    /// 引用任意文本中出现的 `name.name` 形式的标识符，跳过字符串字面量
    ///
    /// 只有最后一段非字面量文本会处理结尾的 `AS alias`。
    pub fn quote_names_in(&self, text: &str) -> String {
        let spans = split_literals(text);
        let last = spans.len() - 1;
        let mut out = String::with_capacity(text.len() + 8);
        for (i, span) in spans.into_iter().enumerate() {
            match span {
                Span::Literal(s) => out.push_str(s),
                Span::Text(s) if i == last => out.push_str(&self.replace_names_and_alias_in(s)),
                Span::Text(s) => out.push_str(&self.replace_names_in(s)),
            }
        }
        out
    }

    fn replace_name(&self, name: &str) -> String {
        let name = name.trim();
        if name == "*" {
            return name.to_string();
        }
        format!("{}{}{}", self.prefix, name, self.suffix)
    }

    fn replace_names_in(&self, text: &str) -> String {
        // 残留的引号说明这里仍有未闭合的字面量，原样返回
        if text.contains('\'') || text.contains('"') {
            return text.to_string();
        }
        QUALIFIED_NAME
            .replace_all(text, |caps: &Captures| {
                format!(
                    "{p}{}{s}.{p}{}{s}",
                    &caps[1],
                    &caps[2],
                    p = self.prefix,
                    s = self.suffix
                )
            })
            .into_owned()
    }

    fn replace_names_and_alias_in(&self, text: &str) -> String {
        let quoted = self.replace_names_in(text);
        match rfind_ignore_case(&quoted, " AS ") {
            Some(pos) => {
                let alias = self.replace_name(&quoted[pos + 4..]);
                format!("{} AS {}", &quoted[..pos], alias)
            }
            None => quoted,
        }
    }
}

/// 文本拆分后的片段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Span<'a> {
    Text(&'a str),
    Literal(&'a str),
}

/// 把文本拆成非字面量片段与字符串字面量片段，结果总以一个（可能为空的）文本片段结束
///
/// 字面量以一串连续的 `'` 或 `"` 开始，在同一行内遇到相同字符、相同长度的
/// 一串时结束（优先尝试最长的开头）；前面带反斜杠的引号不会结束字面量。
pub(crate) fn split_literals(text: &str) -> Vec<Span<'_>> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if matches!(bytes[i], b'\'' | b'"') {
            if let Some(end) = literal_end(bytes, i) {
                spans.push(Span::Text(&text[start..i]));
                spans.push(Span::Literal(&text[i..end]));
                start = end;
                i = end;
                continue;
            }
        }
        i += 1;
    }
    spans.push(Span::Text(&text[start..]));
    spans
}

fn literal_end(bytes: &[u8], open: usize) -> Option<usize> {
    let quote = bytes[open];
    let run = bytes[open..].iter().take_while(|&&b| b == quote).count();
    for len in (1..=run).rev() {
        let mut j = open + len;
        while j + len <= bytes.len() {
            if bytes[j] == b'\n' {
                break;
            }
            if bytes[j - 1] != b'\\' && bytes[j..j + len].iter().all(|&b| b == quote) {
                return Some(j + len);
            }
            j += 1;
        }
    }
    None
}

/// 不区分 ASCII 大小写地查找 `needle` 最后一次出现的字节位置
pub(crate) fn rfind_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.len() > h.len() {
        return None;
    }
    (0..=h.len() - n.len())
        .rev()
        .find(|&i| h[i..i + n.len()].eq_ignore_ascii_case(n))
}

/// 不区分 ASCII 大小写地判断前缀
pub(crate) fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.len() >= prefix.len() && text.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quoter() -> Quoter {
        Quoter::default()
    }

    #[test]
    fn test_quote_name() {
        let q = quoter();
        assert_eq!(q.quote_name("table AS alias"), r#""table" AS "alias""#);
        assert_eq!(q.quote_name("table.col AS alias"), r#""table"."col" AS "alias""#);
        assert_eq!(q.quote_name("table alias"), r#""table" "alias""#);
        assert_eq!(q.quote_name("table.col alias"), r#""table"."col" "alias""#);
        assert_eq!(q.quote_name("table"), r#""table""#);
        assert_eq!(q.quote_name("*"), "*");
        assert_eq!(q.quote_name("*.*"), "*.*");
        assert_eq!(q.quote_name("table.*"), r#""table".*"#);
    }

    #[test]
    fn test_quote_name_lowercase_as_and_padding() {
        let q = quoter();
        assert_eq!(q.quote_name("  t1 as a1 "), r#""t1" AS "a1""#);
    }

    #[test]
    fn test_quote_name_dot_composition() {
        let q = quoter();
        assert_eq!(
            q.quote_name("a.b"),
            format!("{}.{}", q.quote_name("a"), q.quote_name("b"))
        );
    }

    #[test]
    fn test_quote_names_in() {
        let q = quoter();
        let sql = r#"*, *.*, f.bar, foo.bar, CONCAT('foo.bar', "baz.dib") AS zim"#;
        assert_eq!(
            q.quote_names_in(sql),
            r#"*, *.*, "f"."bar", "foo"."bar", CONCAT('foo.bar', "baz.dib") AS "zim""#
        );
    }

    #[test]
    fn test_quote_names_in_only_last_span_gets_alias() {
        let q = quoter();
        // 字面量之前的 AS 不会被当作别名处理
        assert_eq!(
            q.quote_names_in("CAST(x AS int) = 'a' OR t.c AS y"),
            r#"CAST(x AS int) = 'a' OR "t"."c" AS "y""#
        );
        assert_eq!(q.quote_names_in("CAST(x AS int) = 'a'"), "CAST(x AS int) = 'a'");
    }

    #[test]
    fn test_quote_names_in_backtick() {
        let q = Quoter::new("`", "`");
        assert_eq!(q.quote_names_in("t.c = 1"), "`t`.`c` = 1");
    }

    #[test]
    fn test_split_literals() {
        assert_eq!(
            split_literals("a = 'x.y' AND b"),
            vec![Span::Text("a = "), Span::Literal("'x.y'"), Span::Text(" AND b")]
        );
        // 双引号串必须以等长的一串结束
        assert_eq!(
            split_literals("''a'b'' c"),
            vec![Span::Text(""), Span::Literal("''a'b''"), Span::Text(" c")]
        );
        // 反斜杠转义的引号不结束字面量
        assert_eq!(
            split_literals(r"'it\'s' x"),
            vec![Span::Text(""), Span::Literal(r"'it\'s'"), Span::Text(" x")]
        );
        // 字面量不跨行
        assert_eq!(split_literals("'a\n'"), vec![Span::Text("'a\n'")]);
    }

    #[test]
    fn test_unclosed_literal_left_alone() {
        let q = quoter();
        assert_eq!(q.quote_names_in("t.c = 'abc"), "t.c = 'abc");
    }

    #[test]
    fn test_rfind_ignore_case() {
        assert_eq!(rfind_ignore_case("a as b AS c", " AS "), Some(6));
        assert_eq!(rfind_ignore_case("abc", " AS "), None);
        assert!(starts_with_ignore_case("on a = b", "ON "));
    }
}
