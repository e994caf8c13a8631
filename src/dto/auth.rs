use serde::Deserialize;
use utoipa::ToSchema;

/// Both fields are optional so a missing one fails as bad credentials
/// instead of a malformed body.
#[derive(Deserialize, Debug, Default, ToSchema)]
#[serde(default)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    /// Trimmed `(username, password)`, `None` when either is blank.
    pub fn credentials(self) -> Option<(String, String)> {
        let username = self.username?.trim().to_string();
        let password = self.password?.trim().to_string();
        if username.is_empty() || password.is_empty() {
            return None;
        }
        Some((username, password))
    }
}
