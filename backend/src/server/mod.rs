//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Key, SameSite};
use actix_web::{App, HttpServer, web};
use tracing::warn;

use signup_backend::domain::RegistrationService;
use signup_backend::domain::ports::{InMemoryUserRepository, UserRepository};
use signup_backend::inbound::http::health::{HealthState, live, ready};
use signup_backend::inbound::http::signup::{show_signup_form, submit_signup};
use signup_backend::inbound::http::state::HttpState;
use signup_backend::outbound::notifications::ChannelRegistrationNotifier;
use signup_backend::outbound::persistence::DieselUserRepository;
use signup_backend::outbound::security::Argon2PasswordHasher;

/// Build the user repository based on configuration.
///
/// Uses the Diesel adapter when a pool is available, otherwise falls back to
/// the in-memory store so the server still comes up for local experiments.
fn build_user_repository(config: &ServerConfig) -> Arc<dyn UserRepository> {
    match &config.db_pool {
        Some(pool) => Arc::new(DieselUserRepository::new(pool.clone())),
        None => {
            warn!("no database pool configured; registrations are stored in memory only");
            Arc::new(InMemoryUserRepository::new())
        }
    }
}

/// Build the cookie session middleware shared by all workers.
fn session_middleware(
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".to_owned())
        .cookie_secure(cookie_secure)
        .cookie_same_site(same_site)
        .build()
}

/// Assemble dependencies and run the HTTP server until shutdown.
pub async fn run(config: ServerConfig) -> std::io::Result<()> {
    let registration = Arc::new(RegistrationService::new(
        build_user_repository(&config),
        Arc::new(Argon2PasswordHasher::with_defaults()),
        Arc::new(ChannelRegistrationNotifier::spawn()),
    ));
    let state = web::Data::new(HttpState::new(registration));

    let health_state = web::Data::new(HealthState::new());
    health_state.mark_ready();

    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        db_pool: _,
    } = config;

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(health_state.clone())
            .wrap(session_middleware(key.clone(), cookie_secure, same_site))
            .service(show_signup_form)
            .service(submit_signup)
            .service(live)
            .service(ready)
    })
    .bind(bind_addr)?
    .run()
    .await
}
