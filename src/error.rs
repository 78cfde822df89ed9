use thiserror::Error;

#[derive(Debug, Error)]
pub enum LakerelayError {
    #[error("request: {message}")]
    Request { message: String },

    #[error("backend: {message}")]
    Backend { message: String },

    #[error("query: {message}")]
    Query { message: String },

    #[error("timeout: query timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("config: {message}")]
    Config { message: String },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("format: {message}")]
    Format { message: String },
}
