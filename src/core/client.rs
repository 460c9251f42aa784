use reqwest::header::{CACHE_CONTROL, HeaderMap, HeaderValue, PRAGMA, USER_AGENT};
use reqwest::multipart::Form;
use reqwest::{Client, Method, Response, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::config::PortalConfig;
use crate::core::token_store::TokenStore;
use crate::error::portal::PortalError;
use crate::http::auth_middleware::AuthHeaderMiddleware;
use crate::http::preview_filter_middleware::PreviewFilterMiddleware;

/// How a 401 from the server is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AuthMode {
    /// A 401 means the stored token is dead: clear it.
    Session,
    /// A 401 is an ordinary answer (bad credentials on login).
    Anonymous,
}

/// Thin client over the portal REST API. Endpoint groups hang off it, see
/// [`PortalClient::programs`], [`PortalClient::catalog`] and friends.
pub struct PortalClient {
    client: ClientWithMiddleware,
    base: Url,
    tokens: TokenStore,
    media_origin: String,
}

impl PortalClient {
    pub fn new(config: &PortalConfig, tokens: TokenStore) -> Result<Self, PortalError> {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("course-portal/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        let client = ClientBuilder::new(client)
            .with(AuthHeaderMiddleware { token_fn: tokens.token_fn() })
            .with(PreviewFilterMiddleware)
            .build();

        let base = Url::parse(&config.api_root())?;
        log::debug!("portal client targeting {}", base);

        Ok(PortalClient {
            client,
            base,
            tokens,
            media_origin: config.media_origin(),
        })
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn media_origin(&self) -> &str {
        &self.media_origin
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens.token().is_some()
    }

    pub(crate) fn url(&self, path: &str) -> Result<Url, PortalError> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, PortalError> {
        let url = self.url(path)?;
        log::debug!("GET {}", url);
        let response = self.client.get(url).query(query).send().await?;
        let response = self.check(response, AuthMode::Session).await?;
        Ok(response.json().await?)
    }

    pub(crate) async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        mode: AuthMode,
    ) -> Result<T, PortalError> {
        let url = self.url(path)?;
        log::debug!("{} {}", method, url);
        let response = self.client.request(method, url).json(body).send().await?;
        let response = self.check(response, mode).await?;
        Ok(response.json().await?)
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), PortalError> {
        let url = self.url(path)?;
        log::debug!("DELETE {}", url);
        let response = self.client.delete(url).send().await?;
        self.check(response, AuthMode::Session).await?;
        Ok(())
    }

    pub(crate) async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<T, PortalError> {
        let url = self.url(path)?;
        log::debug!("POST {} (multipart)", url);
        let response = self.client.post(url).multipart(form).send().await?;
        let response = self.check(response, AuthMode::Session).await?;
        Ok(response.json().await?)
    }

    /// Maps non-success statuses to [`PortalError`]s.
    async fn check(&self, response: Response, mode: AuthMode) -> Result<Response, PortalError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if mode == AuthMode::Session {
            if status == StatusCode::UNAUTHORIZED {
                log::info!("server rejected the session token, clearing it");
                if let Err(err) = self.tokens.clear() {
                    log::warn!("failed to clear session: {}", err);
                }
                return Err(PortalError::Unauthorized);
            }
            if status == StatusCode::FORBIDDEN {
                return Err(PortalError::Forbidden);
            }
        }

        let text = response.text().await.unwrap_or_default();
        Err(PortalError::Api {
            status: status.as_u16(),
            message: error_field(&text).unwrap_or_else(|| plain_text_or_reason(&text, status)),
        })
    }
}

/// The `error` string of a JSON error body, if there is one.
fn error_field(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("error")
        .or_else(|| value.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Some handlers answer errors with a bare text body.
fn plain_text_or_reason(body: &str, status: StatusCode) -> String {
    let body = body.trim();
    if !body.is_empty() && body.len() <= 200 && !body.starts_with('<') {
        body.to_string()
    } else {
        status.canonical_reason().unwrap_or("request failed").to_string()
    }
}
