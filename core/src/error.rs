use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SqlQueryError {
    /// 同一语句中表名或别名被重复引用（FROM / JOIN）
    #[error("Cannot reference '{reference}' after '{previous}'")]
    DuplicateReference { reference: String, previous: String },
    /// 批量插入时某一行缺少首行确定的列
    #[error("Column {column} missing from row {row}.")]
    MissingColumn { column: String, row: usize },
    /// SELECT 语句没有任何列
    #[error("No columns in the SELECT.")]
    NoColumns,
    /// 语句中的命名占位符没有对应的绑定值
    #[error("No value bound for placeholder ':{0}'")]
    UnboundPlaceholder(String),
    /// Factory configuration could not be parsed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, SqlQueryError>;
