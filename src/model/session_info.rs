use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What gets written to the session file after a successful login.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct SessionInfo {
    pub token: String,
    pub username: String,
    pub saved_at: DateTime<Utc>,
}

impl SessionInfo {
    pub fn new(token: &str, username: &str) -> Self {
        SessionInfo {
            token: token.to_string(),
            username: username.to_string(),
            saved_at: Utc::now(),
        }
    }
}
