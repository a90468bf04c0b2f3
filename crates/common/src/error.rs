//! Error types shared across Autosquelch crates.

/// Top-level error type for Autosquelch operations.
#[derive(Debug, thiserror::Error)]
pub enum AutosquelchError {
    #[error("Window error: {message}")]
    Window { message: String },

    #[error("Capture error: {message}")]
    Capture { message: String },

    #[error("Input simulation error: {message}")]
    Input { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid pixel buffer: {message}")]
    InvalidBuffer { message: String },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using AutosquelchError.
pub type AutosquelchResult<T> = Result<T, AutosquelchError>;

impl AutosquelchError {
    pub fn window(msg: impl Into<String>) -> Self {
        Self::Window {
            message: msg.into(),
        }
    }

    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture {
            message: msg.into(),
        }
    }

    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn invalid_buffer(msg: impl Into<String>) -> Self {
        Self::InvalidBuffer {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_render_their_category() {
        assert_eq!(
            AutosquelchError::window("no handle").to_string(),
            "Window error: no handle"
        );
        assert_eq!(
            AutosquelchError::invalid_buffer("stride too small").to_string(),
            "Invalid pixel buffer: stride too small"
        );
    }
}
