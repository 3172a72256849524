//! 集成测试共用的 SQL 比较辅助

#![allow(dead_code)]

use sqlquery::Quoter;

/// 去掉每行首尾的空白，便于用缩进书写期望的 SQL
pub fn normalize_sql(sql: &str) -> String {
    sql.trim()
        .lines()
        .map(|line| line.trim_matches(|c| c == ' ' || c == '\t'))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `<<name>>` 换成方言的引用符号
pub fn requote(sql: &str, quoter: Quoter) -> String {
    sql.replace("<<", quoter.prefix()).replace(">>", quoter.suffix())
}

#[track_caller]
pub fn assert_same_sql(expect: &str, actual: &str, quoter: Quoter) {
    assert_eq!(
        normalize_sql(&requote(expect, quoter)),
        normalize_sql(actual),
        "\n--- actual ---\n{}\n",
        actual
    );
}
