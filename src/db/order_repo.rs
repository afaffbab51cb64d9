// src/db/order_repo.rs

use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::{
    common::{error::AppError, time_window::DayWindow},
    db::pinot::{PinotConnection, PinotEndpoint, ResultTable},
    models::order::Order,
};

const ORDER_COLUMNS: [&str; 7] = [
    "ORDERID",
    "USERID",
    "ORDER_TIMESTAMP",
    "COFFEE_TYPES",
    "QUANTITY",
    "TOTAL_PRICE",
    "STATUS",
];

/// Monta o SELECT dos pedidos. Com janela, o filtro é semiaberto em epoch millis.
/// O LIMIT é sempre explícito: sem ele o Pinot devolve só 10 linhas.
pub fn build_orders_query(table: &str, window: Option<&DayWindow>, limit: u32) -> String {
    let mut sql = format!("SELECT {} FROM {}", ORDER_COLUMNS.join(", "), table);

    if let Some(window) = window {
        sql.push_str(&format!(
            " WHERE ORDER_TIMESTAMP >= {} AND ORDER_TIMESTAMP < {}",
            window.start_millis(),
            window.end_millis()
        ));
    }

    sql.push_str(&format!(" LIMIT {limit}"));
    sql
}

#[derive(Clone)]
pub struct OrderRepository {
    endpoint: PinotEndpoint,
    table: String,
    row_limit: u32,
}

impl OrderRepository {
    pub fn new(endpoint: PinotEndpoint, table: String, row_limit: u32) -> Self {
        Self {
            endpoint,
            table,
            row_limit,
        }
    }

    // Uma conexão nova por chamada, descartada no final.
    pub async fn fetch_orders(&self, window: Option<&DayWindow>) -> Result<Vec<Order>, AppError> {
        let sql = build_orders_query(&self.table, window, self.row_limit);

        let table = PinotConnection::connect(&self.endpoint)?.query(&sql).await?;
        let mut orders = decode_orders(&table)?;

        // O broker pode ignorar o fuso; a janela é revalidada aqui
        if let Some(window) = window {
            orders.retain(|o| window.contains(o.order_timestamp));
        }

        tracing::info!(rows = orders.len(), table = %self.table, "Pedidos carregados do Pinot");
        Ok(orders)
    }
}

// --- Decodificação das linhas ---

struct ColumnMap {
    order_id: usize,
    user_id: usize,
    timestamp: usize,
    coffee_type: usize,
    quantity: usize,
    total_price: usize,
    status: usize,
}

impl ColumnMap {
    fn from_table(table: &ResultTable) -> Result<Self, AppError> {
        let find = |name: &str| {
            table
                .column_index(name)
                .ok_or_else(|| AppError::InvalidResponse(format!("coluna {name} ausente")))
        };

        Ok(Self {
            order_id: find("ORDERID")?,
            user_id: find("USERID")?,
            timestamp: find("ORDER_TIMESTAMP")?,
            coffee_type: find("COFFEE_TYPES")?,
            quantity: find("QUANTITY")?,
            total_price: find("TOTAL_PRICE")?,
            status: find("STATUS")?,
        })
    }
}

pub fn decode_orders(table: &ResultTable) -> Result<Vec<Order>, AppError> {
    if table.rows.is_empty() {
        return Ok(Vec::new());
    }

    let cols = ColumnMap::from_table(table)?;

    table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            decode_row(row, &cols)
                .map_err(|msg| AppError::InvalidResponse(format!("linha {i}: {msg}")))
        })
        .collect()
}

fn decode_row(row: &[Value], cols: &ColumnMap) -> Result<Order, String> {
    let cell = |idx: usize| row.get(idx).ok_or_else(|| format!("coluna {idx} ausente na linha"));

    Ok(Order {
        order_id: as_text(cell(cols.order_id)?),
        user_id: as_text(cell(cols.user_id)?),
        order_timestamp: parse_timestamp(cell(cols.timestamp)?)?,
        coffee_type: as_text(cell(cols.coffee_type)?),
        quantity: parse_quantity(cell(cols.quantity)?)?,
        total_price: parse_price(cell(cols.total_price)?)?,
        status: as_text(cell(cols.status)?),
    })
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Aceita epoch millis (número ou texto) e texto no formato do Pinot ou RFC 3339.
fn parse_timestamp(value: &Value) -> Result<DateTime<Utc>, String> {
    let from_millis = |ms: i64| {
        Utc.timestamp_millis_opt(ms)
            .single()
            .ok_or_else(|| format!("timestamp fora do intervalo: {ms}"))
    };

    match value {
        Value::Number(n) => match n.as_i64() {
            Some(ms) => from_millis(ms),
            None => Err(format!("timestamp inválido: {n}")),
        },
        Value::String(s) => {
            let s = s.trim();
            if let Ok(ms) = s.parse::<i64>() {
                return from_millis(ms);
            }
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Ok(dt.with_timezone(&Utc));
            }
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
                .map(|naive| naive.and_utc())
                .map_err(|_| format!("timestamp inválido: {s}"))
        }
        other => Err(format!("timestamp inválido: {other}")),
    }
}

fn parse_quantity(value: &Value) -> Result<i64, String> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .ok_or_else(|| format!("quantidade inválida: {n}")),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("quantidade inválida: {s}")),
        other => Err(format!("quantidade inválida: {other}")),
    }
}

// Pelo texto do número, para 120.5 não virar 120.4999...
fn parse_price(value: &Value) -> Result<Decimal, String> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        other => return Err(format!("preço inválido: {other}")),
    };

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| format!("preço inválido: {text}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn bangkok_may_first() -> DayWindow {
        DayWindow::for_local_date(
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            chrono_tz::Asia::Bangkok,
        )
        .unwrap()
    }

    fn table(rows: Vec<Vec<Value>>) -> ResultTable {
        ResultTable {
            columns: ORDER_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    #[test]
    fn unfiltered_query_selects_whole_table() {
        let sql = build_orders_query("COFFEECITY", None, 100_000);

        assert_eq!(
            sql,
            "SELECT ORDERID, USERID, ORDER_TIMESTAMP, COFFEE_TYPES, QUANTITY, TOTAL_PRICE, STATUS \
             FROM COFFEECITY LIMIT 100000"
        );
    }

    #[test]
    fn filtered_query_uses_half_open_local_day() {
        let window = bangkok_may_first();
        let sql = build_orders_query("COFFEECITY", Some(&window), 500);

        // 2024-04-30T17:00:00Z e 2024-05-01T17:00:00Z
        assert!(sql.contains("WHERE ORDER_TIMESTAMP >= 1714496400000 AND ORDER_TIMESTAMP < 1714582800000"));
        assert!(sql.ends_with("LIMIT 500"));
    }

    #[test]
    fn decodes_numbers_and_strings() {
        let decoded = decode_orders(&table(vec![
            vec![
                json!("o-1"),
                json!(42),
                json!(1714539600000_i64),
                json!("Latte"),
                json!(2),
                json!(120.5),
                json!("completed"),
            ],
            vec![
                json!("o-2"),
                json!("u-7"),
                json!("2024-05-01 03:00:00.0"),
                json!("Espresso"),
                json!("1"),
                json!("80"),
                json!("pending"),
            ],
        ]))
        .unwrap();

        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].user_id, "42");
        assert_eq!(decoded[0].total_price, Decimal::new(1205, 1));
        assert_eq!(decoded[0].quantity, 2);
        assert_eq!(decoded[1].order_timestamp.to_rfc3339(), "2024-05-01T03:00:00+00:00");
        assert_eq!(decoded[1].total_price, Decimal::from(80));
    }

    #[test]
    fn missing_column_is_invalid_response() {
        let bad = ResultTable {
            columns: vec!["ORDERID".to_string()],
            rows: vec![vec![json!("o-1")]],
        };

        assert!(matches!(decode_orders(&bad), Err(AppError::InvalidResponse(_))));
    }

    #[test]
    fn empty_result_needs_no_schema() {
        assert!(decode_orders(&ResultTable::default()).unwrap().is_empty());
    }

    #[test]
    fn garbage_price_is_invalid_response() {
        let result = decode_orders(&table(vec![vec![
            json!("o-1"),
            json!("u-1"),
            json!(0),
            json!("Latte"),
            json!(1),
            json!("abc"),
            json!("pending"),
        ]]));

        assert!(matches!(result, Err(AppError::InvalidResponse(ref m)) if m.contains("linha 0")));
    }

    #[tokio::test]
    async fn fetch_keeps_only_rows_inside_the_day() {
        let window = bangkok_may_first();
        let server = MockServer::start().await;

        // start, end - 1ms e end: o último fica de fora
        Mock::given(method("POST"))
            .and(path("/query/sql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "resultTable": {
                    "dataSchema": { "columnNames": ORDER_COLUMNS },
                    "rows": [
                        ["o-1", "u-1", window.start_millis(), "Latte", 1, 100, "completed"],
                        ["o-2", "u-1", window.end_millis() - 1, "Latte", 1, 120, "completed"],
                        ["o-3", "u-2", window.end_millis(), "Espresso", 1, 80, "pending"]
                    ]
                },
                "exceptions": []
            })))
            .mount(&server)
            .await;

        let address = server.address();
        let repo = OrderRepository::new(
            PinotEndpoint {
                host: address.ip().to_string(),
                port: address.port(),
                scheme: "http".to_string(),
                path: "/query/sql".to_string(),
                timeout: Duration::from_secs(5),
            },
            "COFFEECITY".to_string(),
            1000,
        );

        let orders = repo.fetch_orders(Some(&window)).await.unwrap();
        let ids: Vec<_> = orders.iter().map(|o| o.order_id.as_str()).collect();

        assert_eq!(ids, vec!["o-1", "o-2"]);
    }

    #[tokio::test]
    async fn unreachable_broker_is_connectivity_error() {
        // Porta 9 (discard) em loopback: ninguém escutando
        let repo = OrderRepository::new(
            PinotEndpoint {
                host: "127.0.0.1".to_string(),
                port: 9,
                scheme: "http".to_string(),
                path: "/query/sql".to_string(),
                timeout: Duration::from_secs(2),
            },
            "COFFEECITY".to_string(),
            10,
        );

        let err = repo.fetch_orders(None).await.unwrap_err();
        assert!(matches!(err, AppError::Connectivity(_)));
        assert!(err.is_data_access());
    }
}
