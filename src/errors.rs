use thiserror::Error;

/// Error type for run tracking operations.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("store write failed: {0}")]
    StoreWrite(String),
    #[error("invalid case: {0}")]
    InvalidCase(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl TrackerError {
    pub fn store_unavailable<T: Into<String>>(msg: T) -> Self {
        TrackerError::StoreUnavailable(msg.into())
    }

    pub fn store_write<T: Into<String>>(msg: T) -> Self {
        TrackerError::StoreWrite(msg.into())
    }

    pub fn invalid_case<T: Into<String>>(msg: T) -> Self {
        TrackerError::InvalidCase(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        TrackerError::Config(msg.into())
    }

    pub fn invalid_argument<T: Into<String>>(msg: T) -> Self {
        TrackerError::InvalidArgument(msg.into())
    }
}
