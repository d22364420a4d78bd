mod config;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use services::employees::{EmployeeDirectory, PostgrestClient};
use services::provider::AuthProvider;
use services::session::GoTrueClient;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let backend = config::BackendConfig::from_env()
        .expect("BACKEND_URL, BACKEND_ANON_KEY and OAUTH_REDIRECT_URI required");
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .expect("invalid PORT");

    let auth = Arc::new(AuthProvider::new(Arc::new(GoTrueClient::new(&backend))));
    auth.init().await;

    let employees = Arc::new(EmployeeDirectory::new(Arc::new(PostgrestClient::new(&backend))));

    let state = state::AppState::new(auth, employees);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "sektor-portal listening");
    axum::serve(listener, app).await.expect("server failed");
}
