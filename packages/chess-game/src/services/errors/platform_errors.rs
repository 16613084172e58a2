#[derive(Debug)]
pub enum PlatformError {
    NotFound(String),
    Request(String),
}

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformError::NotFound(what) => write!(f, "Not found: {}", what),
            PlatformError::Request(msg) => write!(f, "Platform request failed: {}", msg),
        }
    }
}

impl std::error::Error for PlatformError {}
