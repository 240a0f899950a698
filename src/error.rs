use thiserror::Error;

/// Failure reported by a content view backend.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("content view backend error: {0}")]
    Backend(String),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error(transparent)]
    View(#[from] ViewError),
    #[error("content view detached before it became ready")]
    ViewDetached,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = BrowserError> = std::result::Result<T, E>;
