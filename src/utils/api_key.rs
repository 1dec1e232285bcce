// src/utils/api_key.rs

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};

use crate::config::Config;

/// Header a client may use to supply its own completion API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// The completion API key resolved for the current request, if any.
#[derive(Debug, Clone)]
pub struct ApiKey(pub Option<String>);

impl ApiKey {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

/// Picks the request's `x-api-key` header when it is non-blank, otherwise the
/// server-side key from the environment.
pub fn resolve_api_key(headers: &HeaderMap, config: &Config) -> ApiKey {
    let from_header = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_owned);

    ApiKey(from_header.or_else(|| config.openai_api_key.clone()))
}

/// Axum Middleware: Credential resolution.
///
/// Injects an `ApiKey` into the request extensions for the generation and
/// analysis handlers. It never rejects: a missing key only matters to the
/// handlers that call the completion API, which report it themselves.
pub async fn api_key_middleware(
    State(config): State<Config>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let key = resolve_api_key(req.headers(), &config);
    req.extensions_mut().insert(key);
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn config(key: Option<&str>) -> Config {
        Config {
            database_url: "sqlite::memory:".to_string(),
            openai_api_key: key.map(str::to_owned),
            openai_base_url: "http://localhost".to_string(),
            openai_model: "gpt-4o".to_string(),
            llm_timeout_secs: 5,
            bind_addr: "127.0.0.1:0".to_string(),
            static_dir: "public".to_string(),
            rust_log: "error".to_string(),
            warnings: Vec::new(),
        }
    }

    #[test]
    fn header_overrides_environment() {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_static(" sk-client "));

        let key = resolve_api_key(&headers, &config(Some("sk-server")));
        assert_eq!(key.as_deref(), Some("sk-client"));
    }

    #[test]
    fn blank_header_falls_back_to_environment() {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_static("   "));

        let key = resolve_api_key(&headers, &config(Some("sk-server")));
        assert_eq!(key.as_deref(), Some("sk-server"));
    }

    #[test]
    fn no_key_anywhere() {
        let key = resolve_api_key(&HeaderMap::new(), &config(None));
        assert_eq!(key.as_deref(), None);
    }
}
