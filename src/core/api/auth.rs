use reqwest::Method;

use crate::core::client::{AuthMode, PortalClient};
use crate::error::portal::PortalError;
use crate::model::user::{LoginRequest, LoginResponse, User};

pub struct AuthApi<'a> {
    pub(crate) client: &'a PortalClient,
}

impl AuthApi<'_> {
    /// `POST /auth/login`. Bad credentials come back as an API error, not as
    /// an expired session.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, PortalError> {
        let body = LoginRequest { username, password };
        self.client
            .send_json(Method::POST, "auth/login", &body, AuthMode::Anonymous)
            .await
    }

    /// `GET /auth/me`: the user behind the current token.
    pub async fn me(&self) -> Result<User, PortalError> {
        self.client.get_json("auth/me", &[]).await
    }
}
