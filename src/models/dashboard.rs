// src/models/dashboard.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::order::{CoffeeTypeFilter, Order};

// 0. Filtros vindos da query string (?coffee_type=Latte&date=2024-05-01&show_raw=true)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardFilters {
    #[serde(default)]
    pub coffee_type: CoffeeTypeFilter,

    // O <input type="date"> vazio chega como "date=", que vira None
    #[serde(default, deserialize_with = "empty_date_as_none")]
    pub date: Option<NaiveDate>,

    #[serde(default)]
    pub show_raw: bool,
}

fn empty_date_as_none<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

// 1. Os Cards do Topo
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_orders: usize,
    pub total_revenue: Decimal,
    pub average_order_value: Option<Decimal>, // None quando não há pedidos
    pub total_items: i64,
}

// 2. Preço médio por tipo de café
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAverage {
    pub coffee_type: String,
    pub average_price: Decimal,
}

// 3. Contagens (por tipo de café ou por status)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelCount {
    pub label: String,
    pub orders: usize,
}

// 4. Histograma de quantidade: faixa fechada [quantity_from, quantity_to]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantityBucket {
    pub quantity_from: i64,
    pub quantity_to: i64,
    pub orders: usize,
}

impl QuantityBucket {
    pub fn label(&self) -> String {
        if self.quantity_from == self.quantity_to {
            self.quantity_from.to_string()
        } else {
            format!("{}-{}", self.quantity_from, self.quantity_to)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub metrics: DashboardMetrics,
    pub average_price_by_coffee_type: Vec<CategoryAverage>,
    pub orders_by_coffee_type: Vec<LabelCount>,
    pub orders_by_status: Vec<LabelCount>,
    pub quantity_distribution: Vec<QuantityBucket>,
    #[serde(skip)]
    pub orders: Vec<Order>,
}

/// Resultado de um carregamento da página.
#[derive(Debug, Clone)]
pub enum DashboardOutcome {
    Ready(DashboardSnapshot),
    // Consulta ok, mas nenhum pedido com o filtro de data ativo
    NoMatches,
    // Falha de conexão/consulta, já convertida em mensagem
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{rejection::QueryRejection, Query};
    use axum::http::Uri;

    fn parse(query: &str) -> Result<DashboardFilters, QueryRejection> {
        let uri: Uri = format!("/?{query}").parse().unwrap();
        Query::<DashboardFilters>::try_from_uri(&uri).map(|Query(filters)| filters)
    }

    #[test]
    fn defaults_to_unfiltered_view() {
        let filters = parse("").unwrap();

        assert_eq!(filters.coffee_type, CoffeeTypeFilter::All);
        assert_eq!(filters.date, None);
        assert!(!filters.show_raw);
    }

    #[test]
    fn empty_date_means_no_date_filter() {
        let filters = parse("coffee_type=Latte&date=").unwrap();

        assert_eq!(filters.coffee_type, CoffeeTypeFilter::Latte);
        assert_eq!(filters.date, None);
    }

    #[test]
    fn parses_iso_date() {
        let filters = parse("date=2024-05-01").unwrap();
        assert_eq!(filters.date, NaiveDate::from_ymd_opt(2024, 5, 1));
    }

    #[test]
    fn raw_table_toggle_from_checkbox() {
        let filters = parse("show_raw=true").unwrap();
        assert!(filters.show_raw);
    }

    #[test]
    fn bucket_label_collapses_single_values() {
        let single = QuantityBucket { quantity_from: 3, quantity_to: 3, orders: 1 };
        let range = QuantityBucket { quantity_from: 1, quantity_to: 100, orders: 2 };

        assert_eq!(single.label(), "3");
        assert_eq!(range.label(), "1-100");
    }

    #[test]
    fn rejects_malformed_date() {
        assert!(parse("date=01/05/2024").is_err());
    }
}
