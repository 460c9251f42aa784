use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Field name to message, in field order. Empty means the form is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn new() -> Self {
        FieldErrors::default()
    }

    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// `Ok(())` when empty, otherwise the errors wrapped as a [`PortalError`].
    pub fn into_result(self) -> Result<(), PortalError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(PortalError::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum PortalError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request failed: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    /// The server rejected the token. The stored session has already been cleared.
    #[error("not logged in or session expired, run `login` first")]
    Unauthorized,

    #[error("you do not have permission to perform this action")]
    Forbidden,

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("{0}")]
    Validation(FieldErrors),

    #[error("{0}")]
    FileRejected(String),

    /// A staged upload points at a child record the server did not return an id for.
    #[error("missing server id for {0}")]
    MissingOwner(String),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error("{0}")]
    Message(String),
}

impl PortalError {
    pub fn new(message: &str) -> Self {
        PortalError::Message(message.to_string())
    }

    /// HTTP status behind this error, when it came from the API.
    pub fn status(&self) -> Option<u16> {
        match self {
            PortalError::Unauthorized => Some(401),
            PortalError::Forbidden => Some(403),
            PortalError::Api { status, .. } => Some(*status),
            PortalError::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Message to show the user: the server's own `error` text when it sent one,
    /// otherwise this error's message, otherwise `fallback`.
    pub fn describe(&self, fallback: &str) -> String {
        let message = match self {
            PortalError::Api { message, .. } => message.trim().to_string(),
            other => other.to_string(),
        };
        if message.is_empty() {
            fallback.to_string()
        } else {
            message
        }
    }
}
