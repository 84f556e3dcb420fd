use serde::Deserialize;

/// Query string for the wallet-identity lookup.
#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub address: Option<String>,
}

/// Request body for profile updates; only provided fields are changed.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub address: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
}
