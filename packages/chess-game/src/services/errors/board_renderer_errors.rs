#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    InvalidPosition(String),
    MalformedSvg(String),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::InvalidPosition(msg) => write!(f, "Invalid position: {}", msg),
            RenderError::MalformedSvg(msg) => write!(f, "Malformed SVG: {}", msg),
        }
    }
}

impl std::error::Error for RenderError {}
