// src/services/dashboard_service.rs

use std::collections::BTreeMap;

use chrono::NaiveDate;
use chrono_tz::Tz;
use rust_decimal::Decimal;

use crate::{
    common::{
        error::AppError,
        time_window::{today_in, DayWindow},
    },
    db::OrderRepository,
    models::{
        dashboard::{
            CategoryAverage, DashboardFilters, DashboardMetrics, DashboardOutcome,
            DashboardSnapshot, LabelCount, QuantityBucket,
        },
        order::Order,
    },
};

#[derive(Clone)]
pub struct DashboardService {
    repo: OrderRepository,
    timezone: Tz,
    default_today: bool,
}

impl DashboardService {
    pub fn new(repo: OrderRepository, timezone: Tz, default_today: bool) -> Self {
        Self {
            repo,
            timezone,
            default_today,
        }
    }

    /// Data efetivamente filtrada: a escolhida, ou hoje se configurado assim.
    pub fn effective_date(&self, filters: &DashboardFilters) -> Option<NaiveDate> {
        filters
            .date
            .or_else(|| self.default_today.then(|| today_in(self.timezone)))
    }

    /// Busca + filtro de categoria + agregação.
    pub async fn load_snapshot(
        &self,
        filters: &DashboardFilters,
    ) -> Result<Option<DashboardSnapshot>, AppError> {
        let date = self.effective_date(filters);
        let window = date
            .map(|d| DayWindow::for_local_date(d, self.timezone))
            .transpose()?;

        let orders: Vec<Order> = self
            .repo
            .fetch_orders(window.as_ref())
            .await?
            .into_iter()
            .filter(|o| filters.coffee_type.matches(o))
            .collect();

        // Com filtro de data, "nenhum pedido" é uma condição à parte
        if orders.is_empty() && window.is_some() {
            return Ok(None);
        }

        Ok(Some(build_snapshot(orders)))
    }

    /// Nunca falha: erros viram `Unavailable` com a mensagem para o usuário.
    pub async fn load(&self, filters: &DashboardFilters) -> DashboardOutcome {
        match self.load_snapshot(filters).await {
            Ok(Some(snapshot)) => DashboardOutcome::Ready(snapshot),
            Ok(None) => DashboardOutcome::NoMatches,
            Err(e) => {
                tracing::error!("🔥 Falha ao carregar o dashboard: {}", e);
                DashboardOutcome::Unavailable(e.user_message())
            }
        }
    }
}

// =============================================================================
//  AGREGAÇÕES (equivalentes a um GROUP BY feito no cliente)
// =============================================================================

pub fn build_snapshot(orders: Vec<Order>) -> DashboardSnapshot {
    DashboardSnapshot {
        metrics: compute_metrics(&orders),
        average_price_by_coffee_type: average_price_by_coffee_type(&orders),
        orders_by_coffee_type: count_by(&orders, |o| &o.coffee_type),
        orders_by_status: count_by(&orders, |o| &o.status),
        quantity_distribution: quantity_distribution(&orders),
        orders,
    }
}

pub fn compute_metrics(orders: &[Order]) -> DashboardMetrics {
    let total_orders = orders.len();
    let total_revenue: Decimal = orders.iter().map(|o| o.total_price).sum();
    let total_items: i64 = orders.iter().map(|o| o.quantity).sum();

    let average_order_value =
        (total_orders > 0).then(|| total_revenue / Decimal::from(total_orders));

    DashboardMetrics {
        total_orders,
        total_revenue,
        average_order_value,
        total_items,
    }
}

/// Uma entrada por tipo de café presente, em ordem alfabética.
pub fn average_price_by_coffee_type(orders: &[Order]) -> Vec<CategoryAverage> {
    let mut groups: BTreeMap<&str, (Decimal, usize)> = BTreeMap::new();
    for order in orders {
        let entry = groups.entry(&order.coffee_type).or_insert((Decimal::ZERO, 0));
        entry.0 += order.total_price;
        entry.1 += 1;
    }

    groups
        .into_iter()
        .map(|(coffee_type, (sum, count))| CategoryAverage {
            coffee_type: coffee_type.to_string(),
            average_price: sum / Decimal::from(count),
        })
        .collect()
}

/// Contagem por rótulo, da maior para a menor (empate: ordem alfabética).
pub fn count_by<F>(orders: &[Order], key: F) -> Vec<LabelCount>
where
    F: Fn(&Order) -> &String,
{
    let mut groups: BTreeMap<&str, usize> = BTreeMap::new();
    for order in orders {
        *groups.entry(key(order).as_str()).or_default() += 1;
    }

    let mut counts: Vec<LabelCount> = groups
        .into_iter()
        .map(|(label, orders)| LabelCount {
            label: label.to_string(),
            orders,
        })
        .collect();
    // sort estável: mantém a ordem alfabética nos empates
    counts.sort_by(|a, b| b.orders.cmp(&a.orders));
    counts
}

// Acima disso as faixas passam a agrupar várias quantidades.
pub const MAX_QUANTITY_BINS: usize = 30;

/// Pedidos por faixa de quantidade, do mínimo ao máximo observado (faixas
/// vazias incluídas). Nunca mais que `MAX_QUANTITY_BINS` faixas.
pub fn quantity_distribution(orders: &[Order]) -> Vec<QuantityBucket> {
    let (Some(min), Some(max)) = (
        orders.iter().map(|o| o.quantity).min(),
        orders.iter().map(|o| o.quantity).max(),
    ) else {
        return Vec::new();
    };

    // i128: max - min + 1 estoura i64 com quantidades extremas
    let (min, max) = (i128::from(min), i128::from(max));
    let span = max - min + 1;
    let bins = MAX_QUANTITY_BINS as i128;
    let width = (span + bins - 1) / bins;
    let bin_count = ((span + width - 1) / width) as usize;

    let mut counts = vec![0usize; bin_count];
    for order in orders {
        let index = ((i128::from(order.quantity) - min) / width) as usize;
        counts[index] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(index, orders)| {
            let from = min + index as i128 * width;
            let to = (from + width - 1).min(max);
            QuantityBucket {
                // from/to ficam entre min e max, que vieram de i64
                quantity_from: from as i64,
                quantity_to: to as i64,
                orders,
            }
        })
        .collect()
}
