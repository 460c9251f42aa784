use crate::core::client::PortalClient;
use crate::error::portal::PortalError;
use crate::model::session_info::SessionInfo;
use crate::model::user::User;

/// Snapshot the route guard works from.
#[derive(Clone, Copy, Debug)]
pub enum SessionState<'a> {
    Loading,
    Anonymous,
    SignedIn(&'a User),
}

/// Who is logged in, backed by the client's token store.
///
/// Starts out loading; [`AuthSession::restore`] resolves a stored token into a user.
pub struct AuthSession<'a> {
    client: &'a PortalClient,
    user: Option<User>,
    loading: bool,
}

impl<'a> AuthSession<'a> {
    pub fn new(client: &'a PortalClient) -> Self {
        AuthSession { client, user: None, loading: true }
    }

    /// Validates a stored token against `/auth/me`. A token the server no longer
    /// accepts is discarded. Never fails: an unusable token just means logged out.
    pub async fn restore(&mut self) -> Option<&User> {
        if self.client.tokens().token().is_some() {
            match self.client.auth().me().await {
                Ok(mut user) => {
                    user.normalize();
                    self.user = Some(user);
                }
                Err(err) => {
                    log::info!("stored session is no longer valid: {}", err);
                    if let Err(err) = self.client.tokens().clear() {
                        log::warn!("failed to clear session: {}", err);
                    }
                    self.user = None;
                }
            }
        }
        self.loading = false;
        self.user.as_ref()
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<&User, PortalError> {
        let mut response = self.client.auth().login(username, password).await?;
        response.user.normalize();
        self.client
            .tokens()
            .set(SessionInfo::new(&response.token, &response.user.username))?;
        log::info!("logged in as {}", response.user.username);
        self.loading = false;
        let user = self.user.insert(response.user);
        Ok(&*user)
    }

    pub fn logout(&mut self) -> Result<(), PortalError> {
        self.user = None;
        self.loading = false;
        self.client.tokens().clear()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<String> {
        self.client.tokens().token()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn state(&self) -> SessionState<'_> {
        match (&self.user, self.loading) {
            (_, true) => SessionState::Loading,
            (Some(user), false) => SessionState::SignedIn(user),
            (None, false) => SessionState::Anonymous,
        }
    }
}
