//src/main.rs

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

mod common;
mod config;
mod db;
mod handlers;
mod models;
mod services;
mod views;

use crate::config::{AppState, DashboardConfig};

fn app(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard::get_dashboard_page))
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/dashboard/summary", get(handlers::dashboard::get_summary))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

#[tokio::main]
async fn main() {
    // RUST_LOG=debug mostra o SQL enviado ao broker
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let config = DashboardConfig::from_env().expect("Configuração inválida.");
    let addr = config.bind_addr.clone();
    let app_state = AppState::new(config);

    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Dashboard escutando em {}", addr);
    axum::serve(listener, app(app_state))
        .await
        .expect("Erro no servidor Axum");
}
