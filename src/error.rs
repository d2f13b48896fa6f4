use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("报告未初始化: 请先调用 initialize")]
    NotInitialized,

    /// 报告文件无法创建、读取、解析或写入
    #[error("存储错误: {0}")]
    Storage(String),

    #[error("序列化错误: {0}")]
    Serialization(String),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl From<std::io::Error> for ReportError {
    fn from(err: std::io::Error) -> Self {
        ReportError::Storage(err.to_string())
    }
}

impl From<calamine::XlsxError> for ReportError {
    fn from(err: calamine::XlsxError) -> Self {
        ReportError::Storage(format!("failed to parse workbook: {}", err))
    }
}

impl From<tempfile::PersistError> for ReportError {
    fn from(err: tempfile::PersistError) -> Self {
        ReportError::Storage(format!("failed to replace report file: {}", err.error))
    }
}

impl From<rust_xlsxwriter::XlsxError> for ReportError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        ReportError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for ReportError {
    fn from(err: anyhow::Error) -> Self {
        ReportError::Other(err.to_string())
    }
}

/// Result type for runreport crate
pub type Result<T> = std::result::Result<T, ReportError>;
