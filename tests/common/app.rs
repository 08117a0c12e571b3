use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::extract::ConnectInfo;
use axum::Extension;
use axum::Router;
use axum_test::TestServer;
use jsonwebtoken::Algorithm;
use pokedex_api::build_router;
use pokedex_api::config::Config;
use pokedex_api::state::AppState;

use super::catalog::FakeCatalog;

/// Test configuration: in-memory SQLite, no rate limits, fake PokeAPI
pub fn test_config(pokeapi_base_url: &str) -> Config {
    Config {
        app_name: "pokedex-api-test".to_string(),
        app_version: "test".to_string(),
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test-jwt-secret-that-is-at-least-32-characters-long".to_string(),
        jwt_algorithm: Algorithm::HS256,
        access_token_expire_minutes: 30,
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_allowed_origins: vec!["http://localhost:3000".to_string()],
        rate_limit_enabled: false,
        pokeapi_base_url: pokeapi_base_url.to_string(),
        pokeapi_timeout_secs: 5,
        pokeapi_cache_capacity: 64,
        pokeapi_locale: "es".to_string(),
        log_json: false,
    }
}

/// Test application wrapper
#[allow(dead_code)]
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub catalog: FakeCatalog,
    router: Router,
}

#[allow(dead_code)]
impl TestApp {
    /// Create a new test application with its own database and fake PokeAPI
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Same as [`new`](Self::new) with per-IP quotas on register and login
    pub async fn with_rate_limits() -> Self {
        Self::with_config(|config| config.rate_limit_enabled = true).await
    }

    async fn with_config(customize: impl FnOnce(&mut Config)) -> Self {
        let catalog = FakeCatalog::spawn().await;

        let mut config = test_config(&catalog.base_url);
        customize(&mut config);

        let state = AppState::new(config)
            .await
            .expect("Failed to create test app state");

        let router = build_router(state.clone());
        let server = serve_from(&router, IpAddr::V4(Ipv4Addr::LOCALHOST));

        Self {
            server,
            state,
            catalog,
            router,
        }
    }

    /// A second client connecting from `ip`, sharing this app's state and
    /// rate limiters
    pub fn client_from(&self, ip: IpAddr) -> TestServer {
        serve_from(&self.router, ip)
    }
}

fn serve_from(router: &Router, ip: IpAddr) -> TestServer {
    let router = router
        .clone()
        .layer(Extension(ConnectInfo(SocketAddr::new(ip, 40_000))));
    TestServer::new(router).expect("Failed to create test server")
}
