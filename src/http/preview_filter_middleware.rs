use http::Extensions;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderMap};
use reqwest::{Body, Request, Response};
use reqwest_middleware::{Middleware, Next, Result};
use serde_json::Value;

use crate::utils::sanitize::{clean_response, contains_local_preview, needs_response_cleanup, sanitize_body};

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"))
}

/// Keeps local `blob:` preview urls from crossing the API boundary in either direction.
///
/// JSON request bodies are rewritten before sending, JSON responses before they are
/// handed back. Responses also lose their `null` array elements and fields. Multipart uploads and other streaming bodies pass through untouched.
pub struct PreviewFilterMiddleware;

impl PreviewFilterMiddleware {
    fn clean_request(req: &mut Request) {
        if !is_json(req.headers()) {
            return;
        }
        let Some(bytes) = req.body().and_then(Body::as_bytes) else {
            return;
        };
        let Ok(json) = serde_json::from_slice::<Value>(bytes) else {
            return;
        };
        if !contains_local_preview(&json) {
            return;
        }
        match serde_json::to_vec(&sanitize_body(json)) {
            Ok(cleaned) => {
                log::debug!("removed local preview media from request to {}", req.url());
                req.headers_mut().remove(CONTENT_LENGTH);
                *req.body_mut() = Some(Body::from(cleaned));
            }
            Err(err) => log::warn!("failed to sanitize request body: {}", err),
        }
    }
}

#[async_trait::async_trait]
impl Middleware for PreviewFilterMiddleware {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        Self::clean_request(&mut req);

        let response = next.run(req, extensions).await?;
        if !is_json(response.headers()) {
            return Ok(response);
        }

        let status = response.status();
        let version = response.version();
        let headers = response.headers().clone();
        let extensions_clone = response.extensions().clone();

        let body_bytes = response.bytes().await?;
        let new_body = match serde_json::from_slice::<Value>(&body_bytes) {
            Ok(json) if needs_response_cleanup(&json) => {
                serde_json::to_vec(&clean_response(json)).unwrap_or_else(|_| body_bytes.to_vec())
            }
            _ => body_bytes.to_vec(),
        };

        let mut builder = http::Response::builder().status(status).version(version);
        if let Some(headers_map) = builder.headers_mut() {
            for (key, value) in headers.iter() {
                if key != CONTENT_LENGTH {
                    headers_map.append(key, value.clone());
                }
            }
        }

        let http_response = builder
            .body(new_body)
            .map_err(|err| reqwest_middleware::Error::Middleware(anyhow::anyhow!("failed to rebuild response: {}", err)))?;

        let mut final_response = Response::from(http_response);
        final_response.extensions_mut().extend(extensions_clone);

        Ok(final_response)
    }
}
