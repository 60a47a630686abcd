//! CORS layer configuration.

use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

use eatfast_core::config::app::CorsConfig;

/// Builds a CORS tower layer from configuration.
///
/// Credentials are only allowed with an explicit origin list, since browsers
/// refuse a wildcard origin on credentialed requests.
pub fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    let wildcard_origin = config.allowed_origins.iter().any(|o| o == "*");
    let wildcard_headers = config.allowed_headers.iter().any(|h| h == "*");
    let credentials = config.allow_credentials && !wildcard_origin && !wildcard_headers;

    let mut layer = CorsLayer::new();

    // Origins
    if wildcard_origin {
        layer = layer.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        layer = layer.allow_origin(origins);
    }

    // Methods
    let methods: Vec<Method> = config
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();
    layer = layer.allow_methods(methods);

    // Headers
    if wildcard_headers {
        layer = layer.allow_headers(Any);
    } else {
        let headers: Vec<HeaderName> = config
            .allowed_headers
            .iter()
            .filter_map(|h| h.parse().ok())
            .collect();
        layer = layer.allow_headers(headers);
    }

    layer
        .allow_credentials(credentials)
        .max_age(Duration::from_secs(config.max_age_seconds))
}
