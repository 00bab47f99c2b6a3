#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },
    #[error("Unexpected data format: {0}")]
    DataFormat(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

impl FetchError {
    /// Whether a retry has a chance of succeeding
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Request(e) => e.is_timeout() || e.is_connect(),
            FetchError::Status { status, .. } => *status >= 500 || *status == 429,
            FetchError::DataFormat(_) | FetchError::NotFound(_) => false,
        }
    }
}
