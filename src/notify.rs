//! Transient user-facing messages.

use std::fmt;

use tracing::warn;

use crate::error::PosError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    /// Error notice for a failed operation. Network failures collapse to
    /// `generic`; API and validation failures keep their own message.
    pub fn from_error(err: &PosError, generic: &str) -> Self {
        warn!(error = %err, "{generic}");
        match err {
            PosError::Network(_) | PosError::Decode(_) | PosError::Storage(_) => {
                Self::error(generic)
            }
            PosError::Api { message, .. } => Self::error(format!("Error: {message}")),
            PosError::Validation(msg) => Self::error(msg.clone()),
            PosError::SessionRequired => Self::error(err.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "ok",
            NoticeLevel::Error => "error",
        };
        write!(f, "[{tag}] {}", self.message)
    }
}
