use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Service returned {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Api { status: u16, message: Option<String> },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status of a rejected call, if the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let with_message = ApiError::Api {
            status: 502,
            message: Some("model unavailable".to_string()),
        };
        assert_eq!(with_message.to_string(), "Service returned 502: model unavailable");
        assert_eq!(with_message.status(), Some(502));

        let bare = ApiError::Api {
            status: 404,
            message: None,
        };
        assert_eq!(bare.to_string(), "Service returned 404");
    }
}
