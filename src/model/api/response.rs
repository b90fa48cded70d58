use serde::{Deserialize, Serialize};

use crate::service::{FailureKind, Rejection};

/// The envelope every JSON response is wrapped in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    /// Set on failures that came from a business rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<FailureKind>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            kind: None,
            data: Some(data),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            kind: None,
            data: None,
        }
    }

    pub fn rejected(rejection: &Rejection) -> Self {
        Self {
            success: false,
            message: rejection.to_string(),
            kind: Some(rejection.kind()),
            data: None,
        }
    }
}

impl ApiResponse<()> {
    /// A success with nothing to return.
    pub fn done(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            kind: None,
            data: None,
        }
    }
}
