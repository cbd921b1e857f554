//! Chat core error types

use thiserror::Error;

/// Failures reported by a host collaborator
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Collaborator unavailable: {0}")]
    Unavailable(String),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HostError {
    /// Check if the host may reasonably retry the same call
    pub fn is_retryable(&self) -> bool {
        match self {
            HostError::Unavailable(_) => true,
            HostError::Io(_) => true,
            HostError::Rejected(_) => false,
            HostError::Json(_) => false,
        }
    }
}

/// Which collaborator a call went to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collaborator {
    ModeSwitcher,
    TaskSink,
    TranscriptSink,
    TaskQuery,
}

impl std::fmt::Display for Collaborator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ModeSwitcher => write!(f, "mode switcher"),
            Self::TaskSink => write!(f, "task sink"),
            Self::TranscriptSink => write!(f, "transcript sink"),
            Self::TaskQuery => write!(f, "task query"),
        }
    }
}

/// Errors surfaced by the dialogue machine
///
/// The core never retries; a failing collaborator call propagates here.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("{collaborator} failed: {source}")]
    Host {
        collaborator: Collaborator,
        #[source]
        source: HostError,
    },

    #[error("Template error: {0}")]
    Template(String),
}

impl ChatError {
    pub fn host(collaborator: Collaborator, source: HostError) -> Self {
        ChatError::Host { collaborator, source }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            ChatError::Host { source, .. } => source.is_retryable(),
            ChatError::Template(_) => false,
        }
    }

    /// The collaborator that failed, if any
    pub fn collaborator(&self) -> Option<Collaborator> {
        match self {
            ChatError::Host { collaborator, .. } => Some(*collaborator),
            ChatError::Template(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_retryable() {
        assert!(HostError::Unavailable("down".to_string()).is_retryable());
        assert!(!HostError::Rejected("nope".to_string()).is_retryable());

        let io = std::io::Error::other("disk");
        assert!(HostError::from(io).is_retryable());
    }

    #[test]
    fn test_chat_error_wraps_host_error() {
        let err = ChatError::host(Collaborator::TaskSink, HostError::Unavailable("offline".to_string()));

        assert!(err.is_retryable());
        assert_eq!(err.collaborator(), Some(Collaborator::TaskSink));
        assert_eq!(err.to_string(), "task sink failed: Collaborator unavailable: offline");
    }

    #[test]
    fn test_template_error_not_retryable() {
        let err = ChatError::Template("missing".to_string());
        assert!(!err.is_retryable());
        assert_eq!(err.collaborator(), None);
    }
}
