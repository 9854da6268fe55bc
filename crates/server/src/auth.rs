//! Bearer-token gateway authentication, ported from the voice agent's
//! `auth_middleware`/`constant_time_compare` pattern. The gateway itself
//! authenticates callers the same way regardless of which upstream vendor
//! ultimately serves the request — this is not per-vendor auth (that's
//! `ResolvedAdapter::auth_value`, applied further downstream in dispatch).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::ServerError;
use crate::state::AppState;

static AUTH_DISABLED_WARNED: AtomicBool = AtomicBool::new(false);

enum AuthCheck {
    Disabled,
    PublicPath,
    MissingKeyConfigured,
    CheckKey(String),
}

fn check_auth_config(state: &AppState, path: &str) -> AuthCheck {
    let config = state.get_config();

    if config.server.public_paths.iter().any(|p| p == path) {
        return AuthCheck::PublicPath;
    }

    if !config.server.auth.enabled {
        return AuthCheck::Disabled;
    }

    if config.server.auth.api_key.is_empty() {
        return AuthCheck::MissingKeyConfigured;
    }

    AuthCheck::CheckKey(config.server.auth.api_key.clone())
    // `config` (the read guard) drops here, before any `.await` below.
}

pub async fn auth_middleware(State(state): State<Arc<AppState>>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();

    match check_auth_config(&state, &path) {
        AuthCheck::PublicPath => next.run(request).await,
        AuthCheck::Disabled => {
            if !AUTH_DISABLED_WARNED.swap(true, Ordering::Relaxed) {
                tracing::warn!("gateway authentication is disabled; every caller is treated as trusted");
            }
            next.run(request).await
        }
        AuthCheck::MissingKeyConfigured => {
            tracing::error!("auth.enabled=true but auth.api_key is empty; rejecting all requests");
            ServerError::Unauthorized.into_response()
        }
        AuthCheck::CheckKey(expected) => {
            let provided = request
                .headers()
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "));

            match provided {
                Some(key) if constant_time_compare(key.as_bytes(), expected.as_bytes()) => next.run(request).await,
                _ => ServerError::Unauthorized.into_response(),
            }
        }
    }
}

/// Compares two byte slices in time independent of where they first
/// differ. Length is checked up front (that leak is unavoidable and
/// harmless for a fixed-length configured key); every byte pair is then
/// XORed and accumulated rather than short-circuiting on the first
/// mismatch.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm_gateway_adapters::AdapterRegistry;
    use llm_gateway_client::UpstreamClient;
    use llm_gateway_config::{DispatchConfig, GatewaySettings};
    use llm_gateway_dispatch::DispatchEngine;
    use llm_gateway_repository::InMemoryModelRepository;

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare(b"secret-key", b"secret-key"));
        assert!(!constant_time_compare(b"secret-key", b"different"));
        assert!(!constant_time_compare(b"short", b"longer-value"));
        assert!(constant_time_compare(b"", b""));
    }

    fn state_with(settings: GatewaySettings) -> AppState {
        let repository = Arc::new(InMemoryModelRepository::new());
        let client = Arc::new(UpstreamClient::new());
        let dispatch = Arc::new(DispatchEngine::new(repository.clone(), AdapterRegistry, client, DispatchConfig::default()));
        AppState::new(settings, repository, dispatch, crate::metrics::test_metrics_handle())
    }

    #[test]
    fn public_path_bypasses_auth_regardless_of_enabled_flag() {
        let mut settings = GatewaySettings::default();
        settings.server.auth.enabled = true;
        settings.server.auth.api_key = "sk-test".to_string();
        let state = state_with(settings);
        assert!(matches!(check_auth_config(&state, "/health"), AuthCheck::PublicPath));
    }

    #[test]
    fn disabled_auth_lets_everything_through() {
        let mut settings = GatewaySettings::default();
        settings.server.auth.enabled = false;
        let state = state_with(settings);
        assert!(matches!(check_auth_config(&state, "/v1/chat/completions"), AuthCheck::Disabled));
    }

    #[test]
    fn enabled_by_default_with_empty_key_is_a_configuration_error() {
        let state = state_with(GatewaySettings::default());
        assert!(matches!(check_auth_config(&state, "/v1/chat/completions"), AuthCheck::MissingKeyConfigured));
    }

    #[test]
    fn enabled_with_key_requires_checking_the_caller() {
        let mut settings = GatewaySettings::default();
        settings.server.auth.api_key = "sk-test".to_string();
        let state = state_with(settings);
        assert!(matches!(check_auth_config(&state, "/v1/chat/completions"), AuthCheck::CheckKey(k) if k == "sk-test"));
    }
}
