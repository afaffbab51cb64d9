// src/models/order.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// Um pedido como está no Pinot. Só leitura: o dashboard nunca altera pedidos.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: String,
    pub user_id: String,
    pub order_timestamp: DateTime<Utc>,
    pub coffee_type: String,
    pub quantity: i64,
    pub total_price: Decimal,
    pub status: String,
}

// --- Seletor de categoria ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CoffeeTypeFilter {
    #[default]
    All,
    Espresso,
    Cappuccino,
    Latte,
    Americano,
}

impl CoffeeTypeFilter {
    /// Ordem em que as opções aparecem no seletor.
    pub const OPTIONS: [CoffeeTypeFilter; 5] = [
        CoffeeTypeFilter::All,
        CoffeeTypeFilter::Espresso,
        CoffeeTypeFilter::Cappuccino,
        CoffeeTypeFilter::Latte,
        CoffeeTypeFilter::Americano,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CoffeeTypeFilter::All => "All",
            CoffeeTypeFilter::Espresso => "Espresso",
            CoffeeTypeFilter::Cappuccino => "Cappuccino",
            CoffeeTypeFilter::Latte => "Latte",
            CoffeeTypeFilter::Americano => "Americano",
        }
    }

    pub fn matches(self, order: &Order) -> bool {
        match self {
            CoffeeTypeFilter::All => true,
            other => order.coffee_type == other.label(),
        }
    }
}
