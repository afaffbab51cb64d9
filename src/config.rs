// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use chrono_tz::Tz;

use crate::{
    db::{OrderRepository, PinotEndpoint},
    services::DashboardService,
};

/// Configuração lida do ambiente (com suporte a `.env`).
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub bind_addr: String,
    pub endpoint: PinotEndpoint,
    pub orders_table: String,
    pub row_limit: u32,
    pub timezone: Tz,
    // true = variante filtrada (sem data escolhida, mostra hoje)
    pub default_today: bool,
}

impl DashboardConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Mesma lógica do `from_env`, mas com a fonte das variáveis injetada.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = get("PINOT_PORT", "8099")
            .parse::<u16>()
            .context("PINOT_PORT deve ser uma porta válida")?;
        let timeout_secs = get("PINOT_TIMEOUT_SECS", "500")
            .parse::<u64>()
            .context("PINOT_TIMEOUT_SECS deve ser um número de segundos")?;
        let row_limit = get("QUERY_ROW_LIMIT", "100000")
            .parse::<u32>()
            .context("QUERY_ROW_LIMIT deve ser um inteiro positivo")?;
        if row_limit == 0 {
            anyhow::bail!("QUERY_ROW_LIMIT deve ser maior que zero");
        }

        let tz_name = get("DASHBOARD_TIMEZONE", "Asia/Bangkok");
        let timezone = tz_name
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("DASHBOARD_TIMEZONE inválido ({tz_name}): {e}"))?;

        let default_today = get("DASHBOARD_DEFAULT_TODAY", "false")
            .parse::<bool>()
            .context("DASHBOARD_DEFAULT_TODAY deve ser true ou false")?;

        Ok(Self {
            bind_addr: get("BIND_ADDR", "0.0.0.0:3000"),
            endpoint: PinotEndpoint {
                host: get("PINOT_HOST", "localhost"),
                port,
                scheme: get("PINOT_SCHEME", "http"),
                path: get("PINOT_PATH", "/query/sql"),
                timeout: Duration::from_secs(timeout_secs),
            },
            orders_table: get("ORDERS_TABLE", "COFFEECITY"),
            row_limit,
            timezone,
            default_today,
        })
    }
}

// O estado compartilhado. Imutável: cada requisição abre a própria conexão.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<DashboardConfig>,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        // --- Monta o gráfico de dependências ---
        let order_repo = OrderRepository::new(
            config.endpoint.clone(),
            config.orders_table.clone(),
            config.row_limit,
        );
        let dashboard_service =
            DashboardService::new(order_repo, config.timezone, config.default_today);

        tracing::info!(
            broker = %config.endpoint.url(),
            table = %config.orders_table,
            timezone = %config.timezone,
            "✅ Estado da aplicação montado"
        );

        Self {
            config: Arc::new(config),
            dashboard_service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<DashboardConfig> {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        DashboardConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_match_the_coffeecity_broker() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.endpoint.url(), "http://localhost:8099/query/sql");
        assert_eq!(config.endpoint.timeout, Duration::from_secs(500));
        assert_eq!(config.orders_table, "COFFEECITY");
        assert_eq!(config.timezone, chrono_tz::Asia::Bangkok);
        assert_eq!(config.row_limit, 100_000);
        assert!(!config.default_today);
    }

    #[test]
    fn overrides_are_applied() {
        let config = config_from(&[
            ("PINOT_HOST", "13.229.112.104"),
            ("PINOT_SCHEME", "https"),
            ("DASHBOARD_TIMEZONE", "America/Sao_Paulo"),
            ("DASHBOARD_DEFAULT_TODAY", "true"),
        ])
        .unwrap();

        assert_eq!(config.endpoint.url(), "https://13.229.112.104:8099/query/sql");
        assert_eq!(config.timezone, chrono_tz::America::Sao_Paulo);
        assert!(config.default_today);
    }

    #[test]
    fn invalid_values_fail_startup() {
        assert!(config_from(&[("PINOT_PORT", "abc")]).is_err());
        assert!(config_from(&[("DASHBOARD_TIMEZONE", "Mars/Olympus")]).is_err());
        assert!(config_from(&[("QUERY_ROW_LIMIT", "0")]).is_err());
    }
}
