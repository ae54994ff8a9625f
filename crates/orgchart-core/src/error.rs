pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load the org hierarchy: {message}")]
    DataFetch { message: String },

    #[error("failed to load chart settings: {message}")]
    SettingsFetch { message: String },

    #[error("search request failed: {message}")]
    Search { message: String },

    #[error("invalid chart settings: {message}")]
    InvalidSettings { message: String },

    #[error("cannot assemble hierarchy: {message}")]
    Import { message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
