use thiserror::Error;

#[derive(Error, Debug)]
pub enum LeadError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Encoding error: {0}")]
    EncodingError(#[from] std::string::FromUtf8Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    /// 持久化端回報的錯誤，訊息原樣保留以便組成「Linha N: ...」
    #[error("{message}")]
    PersistenceError { message: String },
}

impl LeadError {
    pub fn persistence(message: impl Into<String>) -> Self {
        LeadError::PersistenceError {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LeadError>;
