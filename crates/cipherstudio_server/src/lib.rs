//! HTTP server wiring for CipherStudio (API, handlers, and shared state).

/// HTTP error mapping for API handlers.
pub mod error;
/// HTTP handlers for project and account endpoints.
pub mod handlers;

pub use cipherstudio_core::{
    config, db, models, AppError, Config, Database, TokenService, DEFAULT_PORT,
};

use axum::{
    extract::DefaultBodyLimit,
    http::{header, request::Parts, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use cipherstudio_core::text::is_loopback_host;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

const CONTENT_SECURITY_POLICY: &str = "default-src 'none'; frame-ancestors 'none'";

/// Shared state passed to HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub config: Arc<Config>,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    /// Construct shared application state.
    ///
    /// # Arguments
    /// - `config`: Loaded configuration.
    /// - `db`: Open database handle.
    ///
    /// # Returns
    /// A new [`AppState`] with a token service keyed by `config.jwt_secret`.
    pub fn new(config: Config, db: Database) -> Self {
        let tokens = Arc::new(TokenService::from_config(&config));
        Self {
            db: Arc::new(db),
            config: Arc::new(config),
            tokens,
        }
    }
}

/// Return `true` for `http(s)://` origins whose host is loopback.
fn is_loopback_origin(origin: &str) -> bool {
    let Some((scheme, rest)) = origin.split_once("://") else {
        return false;
    };
    if scheme != "http" && scheme != "https" {
        return false;
    }
    let authority = rest.split('/').next().unwrap_or(rest);
    let host = if authority.starts_with('[') {
        match authority.find(']') {
            Some(end) => &authority[..=end],
            None => return false,
        }
    } else {
        authority.split(':').next().unwrap_or(authority)
    };
    is_loopback_host(host)
}

fn cors_layer(allow_public_access: bool) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::PUT];
    if allow_public_access {
        CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(methods)
            .allow_headers(tower_http::cors::Any)
    } else {
        // Browser editors run on their own dev-server port, so any loopback
        // port is accepted.
        CorsLayer::new()
            .allow_origin(AllowOrigin::predicate(
                |origin: &HeaderValue, _parts: &Parts| {
                    origin.to_str().map(is_loopback_origin).unwrap_or(false)
                },
            ))
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
    }
}

/// Create the application router with all routes and middleware.
///
/// # Arguments
/// - `state`: Shared application state.
/// - `allow_public_access`: Whether to allow cross-origin requests from any origin.
///
/// # Returns
/// Configured `axum::Router`.
pub fn create_app(state: AppState, allow_public_access: bool) -> Router {
    let body_limit = state.config.max_body_size;

    Router::new()
        .route("/", get(handlers::root))
        .route(
            "/api/projects",
            post(handlers::project::create_project).get(handlers::project::list_projects),
        )
        .route(
            "/api/projects/:projectId",
            get(handlers::project::get_project).put(handlers::project::update_project),
        )
        .route(
            "/api/projects/:projectId/sandbox",
            get(handlers::project::sandbox_files),
        )
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/me", get(handlers::auth::me))
        .with_state(state)
        .layer(
            tower::ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(body_limit))
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors_layer(allow_public_access))
                .layer(SetResponseHeaderLayer::overriding(
                    header::CONTENT_SECURITY_POLICY,
                    HeaderValue::from_static(CONTENT_SECURITY_POLICY),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_FRAME_OPTIONS,
                    HeaderValue::from_static("DENY"),
                )),
        )
}

/// Resolve the listener address from env var overrides and security policy.
///
/// # Arguments
/// - `config`: Server configuration containing the configured `port`.
/// - `allow_public_access`: Whether non-loopback bind targets are permitted.
///
/// # Returns
/// A validated socket address that enforces loopback when public access is disabled.
pub fn resolve_bind_address(config: &Config, allow_public_access: bool) -> SocketAddr {
    let default_bind = SocketAddr::from(([127, 0, 0, 1], config.port));
    let requested = match std::env::var("BIND") {
        Ok(value) => match value.trim().parse::<SocketAddr>() {
            Ok(addr) => addr,
            Err(err) => {
                tracing::warn!(
                    "Invalid BIND='{}': {}. Falling back to {}",
                    value,
                    err,
                    default_bind
                );
                default_bind
            }
        },
        Err(_) => default_bind,
    };

    if allow_public_access || requested.ip().is_loopback() {
        return requested;
    }

    tracing::warn!(
        "Non-loopback bind {} requested without ALLOW_PUBLIC_ACCESS; forcing 127.0.0.1",
        requested
    );
    SocketAddr::from(([127, 0, 0, 1], requested.port()))
}

/// Run the Axum server with graceful shutdown support.
///
/// # Arguments
/// - `listener`: Bound TCP listener for the server.
/// - `state`: Shared application state.
/// - `allow_public_access`: Whether to allow cross-origin requests from any origin.
/// - `shutdown_signal`: Future that resolves when shutdown should start.
///
/// # Errors
/// Returns any I/O error produced by `axum::serve`.
pub async fn serve_router(
    listener: tokio::net::TcpListener,
    state: AppState,
    allow_public_access: bool,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    let app = create_app(state, allow_public_access);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
}

#[cfg(test)]
mod tests {
    use super::{is_loopback_origin, resolve_bind_address};
    use cipherstudio_core::env::ScopedEnv;
    use cipherstudio_core::Config;
    use std::net::SocketAddr;

    fn config(port: u16) -> Config {
        Config {
            db_path: String::from("/tmp/cipherstudio-db"),
            port,
            max_body_size: 1024,
            jwt_secret: "secret".to_string(),
            token_ttl_secs: 60,
            bcrypt_cost: 4,
        }
    }

    #[test]
    fn resolve_bind_address_enforces_loopback_when_public_access_disabled() {
        let mut env = ScopedEnv::lock();
        env.set("BIND", "0.0.0.0:4040");
        let resolved = resolve_bind_address(&config(4040), false);
        assert_eq!(resolved.ip().to_string(), "127.0.0.1");
        assert_eq!(resolved.port(), 4040);

        let public = resolve_bind_address(&config(4040), true);
        assert_eq!(public.ip().to_string(), "0.0.0.0");
    }

    #[test]
    fn resolve_bind_address_allows_loopback_and_invalid_fallback() {
        let mut env = ScopedEnv::lock();
        env.remove("BIND");
        let loopback = resolve_bind_address(&config(4041), false);
        assert_eq!(loopback, SocketAddr::from(([127, 0, 0, 1], 4041)));

        env.set("BIND", "bad:host");
        let fallback = resolve_bind_address(&config(4041), false);
        assert_eq!(fallback, SocketAddr::from(([127, 0, 0, 1], 4041)));
    }

    #[test]
    fn loopback_origins_accept_any_port() {
        for origin in [
            "http://localhost:3000",
            "http://127.0.0.1:5173",
            "https://localhost",
            "http://[::1]:8080",
        ] {
            assert!(is_loopback_origin(origin), "origin: {origin}");
        }
        for origin in [
            "http://example.com",
            "http://localhost.evil.com:3000",
            "file://localhost",
            "null",
        ] {
            assert!(!is_loopback_origin(origin), "origin: {origin}");
        }
    }
}
