// src/views/page.rs

use askama::Template;
use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::{
    common::error::AppError,
    models::{
        dashboard::{DashboardFilters, DashboardMetrics, DashboardOutcome, DashboardSnapshot},
        order::{CoffeeTypeFilter, Order},
    },
    views::{
        charts::{self, Chart},
        format::{currency, integer},
        theme::{Theme, THEME},
    },
};

pub const NO_MATCHES_MESSAGE: &str = "No orders found for the selected filters.";

/// Tudo que a página precisa para ser desenhada.
pub struct PageContext<'a> {
    pub filters: &'a DashboardFilters,
    pub date: Option<NaiveDate>,
    pub timezone: Tz,
    pub outcome: &'a DashboardOutcome,
}

// O template só itera e imprime; tudo chega formatado.
#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    theme: &'static Theme,
    options: Vec<SelectOption>,
    date_value: String,
    timezone: String,
    show_raw: bool,
    alert: Option<Alert>,
    cards: Vec<MetricCard>,
    charts: Vec<Chart>,
    rows: Vec<RawRow>,
}

struct SelectOption {
    label: &'static str,
    selected: bool,
}

struct Alert {
    level: &'static str,
    message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricCard {
    pub title: &'static str,
    pub value: String,
}

struct RawRow {
    order_id: String,
    user_id: String,
    ordered_at: String,
    coffee_type: String,
    quantity: i64,
    total_price: String,
    status: String,
}

pub fn render_dashboard(ctx: &PageContext<'_>) -> Result<String, AppError> {
    let mut page = DashboardTemplate {
        theme: &THEME,
        // Formulário GET: cada interação recarrega a página inteira
        options: CoffeeTypeFilter::OPTIONS
            .into_iter()
            .map(|option| SelectOption {
                label: option.label(),
                selected: option == ctx.filters.coffee_type,
            })
            .collect(),
        date_value: ctx
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        timezone: ctx.timezone.to_string(),
        show_raw: ctx.filters.show_raw,
        alert: None,
        cards: Vec::new(),
        charts: Vec::new(),
        rows: Vec::new(),
    };

    match ctx.outcome {
        DashboardOutcome::Unavailable(message) => {
            page.alert = Some(Alert {
                level: "error",
                message: message.clone(),
            });
        }
        DashboardOutcome::NoMatches => {
            page.alert = Some(Alert {
                level: "warning",
                message: NO_MATCHES_MESSAGE.to_string(),
            });
        }
        DashboardOutcome::Ready(snapshot) => {
            page.cards = metric_cards(&snapshot.metrics);
            page.charts = chart_grid(snapshot)?;
            if ctx.filters.show_raw {
                page.rows = raw_rows(&snapshot.orders, ctx.timezone);
            }
        }
    }

    page.render().map_err(|e| {
        AppError::InternalServerError(anyhow::anyhow!("Falha ao renderizar o dashboard: {e}"))
    })
}

pub fn metric_cards(metrics: &DashboardMetrics) -> Vec<MetricCard> {
    let card = |title, value| MetricCard { title, value };
    vec![
        card("Total Orders", integer(metrics.total_orders)),
        card("Total Revenue", currency(metrics.total_revenue)),
        card(
            "Average Order Value",
            metrics
                .average_order_value
                .map(currency)
                .unwrap_or_else(|| "N/A".to_string()),
        ),
        card("Total Items Sold", integer(metrics.total_items)),
    ]
}

// Duas colunas: preço médio + status à esquerda, quantidade + contagem à direita
fn chart_grid(snapshot: &DashboardSnapshot) -> Result<Vec<Chart>, AppError> {
    Ok(vec![
        charts::average_price_by_coffee_type(&snapshot.average_price_by_coffee_type)?,
        charts::quantity_distribution(&snapshot.quantity_distribution)?,
        charts::order_status_distribution(&snapshot.orders_by_status)?,
        charts::orders_by_coffee_type(&snapshot.orders_by_coffee_type)?,
    ])
}

fn raw_rows(orders: &[Order], tz: Tz) -> Vec<RawRow> {
    orders
        .iter()
        .map(|order| RawRow {
            order_id: order.order_id.clone(),
            user_id: order.user_id.clone(),
            ordered_at: order
                .order_timestamp
                .with_timezone(&tz)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            coffee_type: order.coffee_type.clone(),
            quantity: order.quantity,
            total_price: order.total_price.to_string(),
            status: order.status.clone(),
        })
        .collect()
}
