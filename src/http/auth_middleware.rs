use std::sync::Arc;

use http::Extensions;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next, Result};

/// Adds `Authorization: Bearer <token>` whenever a token is available.
pub struct AuthHeaderMiddleware {
    pub token_fn: Arc<dyn Fn() -> Option<String> + Send + Sync>,
}

#[async_trait::async_trait]
impl Middleware for AuthHeaderMiddleware {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        if let Some(token) = (self.token_fn)() {
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => {
                    req.headers_mut().insert(AUTHORIZATION, value);
                }
                Err(_) => log::warn!("stored token is not a valid header value, sending request without it"),
            }
        }
        next.run(req, extensions).await
    }
}
