// src/handlers/dashboard.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    models::dashboard::DashboardFilters,
    services::dashboard_service::build_snapshot,
    views::page::{render_dashboard, PageContext},
};

// GET /
// Cada interação (filtro, data, tabela bruta) recarrega a página inteira.
pub async fn get_dashboard_page(
    State(app_state): State<AppState>,
    Query(filters): Query<DashboardFilters>,
) -> Result<impl IntoResponse, AppError> {
    let service = &app_state.dashboard_service;
    let outcome = service.load(&filters).await;

    let html = render_dashboard(&PageContext {
        filters: &filters,
        date: service.effective_date(&filters),
        timezone: app_state.config.timezone,
        outcome: &outcome,
    })?;

    // Falha no broker ainda é uma página válida, com a mensagem de erro
    Ok((StatusCode::OK, Html(html)))
}

// GET /api/dashboard/summary
pub async fn get_summary(
    State(app_state): State<AppState>,
    Query(filters): Query<DashboardFilters>,
) -> Result<impl IntoResponse, AppError> {
    let snapshot = app_state.dashboard_service.load_snapshot(&filters).await?;

    // Dia sem pedidos: snapshot vazio em vez de erro
    let snapshot = match snapshot {
        Some(snapshot) => snapshot,
        None => build_snapshot(Vec::new()),
    };

    Ok((StatusCode::OK, Json(snapshot)))
}
