use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Please enter a message")]
    EmptyInput,

    #[error("Please enter your Hugging Face token first")]
    Unauthenticated,

    #[error("A message is already being sent, wait for the response")]
    Busy,

    #[error("Invalid conversation history: {0}")]
    InvalidHistory(String),

    #[error("{message}")]
    CompletionFailed {
        message: String,
        status_code: Option<u16>,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ChatError {
    pub(crate) fn completion_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ChatError::CompletionFailed {
            message: message.into(),
            status_code: None,
            source: Some(Box::new(source)),
        }
    }

    pub(crate) fn storage(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ChatError::Storage {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// HTTP status code of a failed completion, if the service answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ChatError::CompletionFailed { status_code, .. } => *status_code,
            _ => None,
        }
    }

    /// Short heading for the notice shown to the user.
    pub fn title(&self) -> &'static str {
        match self {
            ChatError::Unauthenticated => "Token Required",
            _ => "Error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_failure_keeps_status_and_message() {
        let err = ChatError::CompletionFailed {
            message: "API call failed with status: 503".to_string(),
            status_code: Some(503),
            source: None,
        };

        assert_eq!(err.status_code(), Some(503));
        assert_eq!(err.to_string(), "API call failed with status: 503");
        assert_eq!(err.title(), "Error");
    }

    #[test]
    fn unauthenticated_has_its_own_title() {
        assert_eq!(ChatError::Unauthenticated.title(), "Token Required");
        assert_eq!(ChatError::Unauthenticated.status_code(), None);
    }
}
