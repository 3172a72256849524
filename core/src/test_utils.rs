//! 测试辅助：忽略行首尾空白比较 SQL，并把 `<<` / `>>` 换成方言的引用符号

use crate::quoter::Quoter;

pub(crate) fn normalize_sql(sql: &str) -> String {
    sql.trim()
        .lines()
        .map(|line| line.trim_matches(|c| c == ' ' || c == '\t'))
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn requote(sql: &str, quoter: Quoter) -> String {
    sql.replace("<<", quoter.prefix()).replace(">>", quoter.suffix())
}

#[track_caller]
pub(crate) fn assert_same_sql(expect: &str, actual: &str, quoter: Quoter) {
    assert_eq!(
        normalize_sql(&requote(expect, quoter)),
        normalize_sql(actual),
        "\n--- actual ---\n{}\n",
        actual
    );
}
