use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl AppError {
    /// 判断是否为行情通道类错误（传输层失败，本轮放弃、下一轮照常重试）
    ///
    /// 循环内部据此区分"跳过本轮"与"跳过单个品种"两种恢复路径
    pub fn is_transport(&self) -> bool {
        matches!(self, AppError::ApiError(_) | AppError::HttpError(_))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
