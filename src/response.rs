use serde::Serialize;
use utoipa::ToSchema;

/// The `{success, message}` body shared by login, logout and every error.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct MessageResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl MessageResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct AuthCheck {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl AuthCheck {
    pub fn anonymous() -> Self {
        Self {
            authenticated: false,
            username: None,
        }
    }

    pub fn signed_in(username: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            username: Some(username.into()),
        }
    }
}
