mod config;
mod dtos;
mod error;
mod handler;
mod identity;
mod middleware;
mod models;
mod routes;
mod service;
mod store;
mod utils;

use std::sync::Arc;

use axum::http::{header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE}, HeaderValue, Method};
use config::Config;
use dotenv::dotenv;
use routes::create_router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::filter::LevelFilter;

use crate::dtos::accountdtos::RegisterAccountDto;
use crate::identity::jwt::JwtIdentityProvider;
use crate::identity::IdentityProvider;
use crate::models::accountmodel::UserRole;
use crate::service::account_service::AccountService;
use crate::service::audit_service::AuditService;
use crate::service::ticket_service::TicketService;
use crate::store::docstore::DocumentStore;
use crate::store::memory::MemoryStore;

#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<dyn IdentityProvider>,
    pub account_service: Arc<AccountService>,
    pub ticket_service: Arc<TicketService>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::DEBUG)
        .init();

    dotenv().ok();

    let config = Config::init();

    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let jwt_provider = Arc::new(JwtIdentityProvider::new(
        config.jwt_secret.clone(),
        config.jwt_maxage,
    ));
    let identity: Arc<dyn IdentityProvider> = jwt_provider.clone();

    let account_service = Arc::new(AccountService::new(store.clone(), identity.clone()));
    let audit_service = Arc::new(AuditService::new(store.clone()));
    let ticket_service = Arc::new(TicketService::new(
        store.clone(),
        account_service.clone(),
        audit_service,
    ));

    // Optional bootstrap admin so a fresh instance is not locked out.
    if let (Some(email), Some(password)) =
        (&config.seed_admin_email, &config.seed_admin_password)
    {
        let payload = RegisterAccountDto {
            email: email.clone(),
            password: password.clone(),
            display_name: "Administrator".to_string(),
            role: UserRole::Admin,
            department: None,
            phone_number: None,
        };

        match account_service.create_account(payload).await {
            Ok(admin) => {
                tracing::info!("seeded admin account {} ({})", admin.email, admin.id);
                match jwt_provider.authenticate(email, password).await {
                    Ok(token) => tracing::info!("dev admin token: {}", token),
                    Err(e) => tracing::warn!("could not issue dev admin token: {}", e),
                }
            }
            Err(e) => tracing::warn!("admin seeding skipped: {}", e),
        }
    }

    let allowed_origins = vec![
        "http://localhost:5173".parse::<HeaderValue>().unwrap(),
        "http://localhost:3000".parse::<HeaderValue>().unwrap(),
        "http://localhost:8000".parse::<HeaderValue>().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE]);

    let app_state = AppState {
        identity,
        account_service,
        ticket_service,
    };

    let app = create_router(Arc::new(app_state)).layer(cors);

    println!(
        "{}",
        format!("🚀 Server is running on http://localhost:{}", config.port)
    );

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", &config.port))
        .await
        .unwrap();

    axum::serve(listener, app).await.unwrap();
}
