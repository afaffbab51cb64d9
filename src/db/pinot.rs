// src/db/pinot.rs

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::common::error::AppError;

/// Onde fica o broker do Pinot. Equivale aos argumentos de `pinotdb.connect`.
#[derive(Debug, Clone)]
pub struct PinotEndpoint {
    pub host: String,
    pub port: u16,
    pub scheme: String,
    pub path: String,
    pub timeout: Duration,
}

impl PinotEndpoint {
    pub fn url(&self) -> String {
        let path = if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };
        format!("{}://{}:{}{}", self.scheme, self.host, self.port, path)
    }
}

// Resposta do broker: só o que usamos.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BrokerResponse {
    result_table: Option<ResultTablePayload>,
    #[serde(default)]
    exceptions: Vec<BrokerException>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultTablePayload {
    data_schema: DataSchema,
    #[serde(default)]
    rows: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DataSchema {
    column_names: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BrokerException {
    #[serde(default)]
    error_code: i64,
    #[serde(default)]
    message: String,
}

/// Tabela devolvida por uma consulta: nomes das colunas + linhas.
#[derive(Debug, Clone, Default)]
pub struct ResultTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.eq_ignore_ascii_case(name))
    }
}

/// Uma "conexão" de uso único: um cliente HTTP criado para uma consulta e descartado depois.
/// Sem pool e sem retry.
pub struct PinotConnection {
    client: Client,
    url: String,
}

impl PinotConnection {
    pub fn connect(endpoint: &PinotEndpoint) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(endpoint.timeout)
            .pool_max_idle_per_host(0)
            .build()?;

        Ok(Self {
            client,
            url: endpoint.url(),
        })
    }

    // Consome a conexão: cada carregamento de página abre a sua.
    pub async fn query(self, sql: &str) -> Result<ResultTable, AppError> {
        tracing::debug!(url = %self.url, sql, "Enviando consulta ao broker");

        let resp = self
            .client
            .post(&self.url)
            .json(&json!({ "sql": sql }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::QueryRejected { status, body });
        }

        let payload: BrokerResponse = resp
            .json()
            .await
            .map_err(|e| AppError::InvalidResponse(e.to_string()))?;

        if !payload.exceptions.is_empty() {
            let detail = payload
                .exceptions
                .iter()
                .map(|e| format!("[{}] {}", e.error_code, e.message))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(AppError::QueryExceptions(detail));
        }

        let table = payload
            .result_table
            .ok_or_else(|| AppError::InvalidResponse("resposta sem resultTable".to_string()))?;

        Ok(ResultTable {
            columns: table.data_schema.column_names,
            rows: table.rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{body_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn endpoint_for(server: &MockServer) -> PinotEndpoint {
        let address = server.address();
        PinotEndpoint {
            host: address.ip().to_string(),
            port: address.port(),
            scheme: "http".to_string(),
            path: "/query/sql".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn url_joins_endpoint_parts() {
        let endpoint = PinotEndpoint {
            host: "13.229.112.104".to_string(),
            port: 8099,
            scheme: "http".to_string(),
            path: "query/sql".to_string(),
            timeout: Duration::from_secs(500),
        };

        assert_eq!(endpoint.url(), "http://13.229.112.104:8099/query/sql");
    }

    #[tokio::test]
    async fn query_posts_sql_and_reads_result_table() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/query/sql"))
            .and(body_json(json!({ "sql": "SELECT STATUS FROM COFFEECITY" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "resultTable": {
                    "dataSchema": {
                        "columnNames": ["STATUS"],
                        "columnDataTypes": ["STRING"]
                    },
                    "rows": [["pending"], ["completed"]]
                },
                "exceptions": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let table = PinotConnection::connect(&endpoint_for(&server))
            .unwrap()
            .query("SELECT STATUS FROM COFFEECITY")
            .await
            .unwrap();

        assert_eq!(table.columns, vec!["STATUS"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.column_index("status"), Some(0));
    }

    #[tokio::test]
    async fn broker_exceptions_are_query_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "exceptions": [{ "errorCode": 150, "message": "SQLParsingError" }]
            })))
            .mount(&server)
            .await;

        let err = PinotConnection::connect(&endpoint_for(&server))
            .unwrap()
            .query("SELEC")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::QueryExceptions(ref m) if m.contains("SQLParsingError")));
    }

    #[tokio::test]
    async fn non_success_status_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("broker down"))
            .mount(&server)
            .await;

        let err = PinotConnection::connect(&endpoint_for(&server))
            .unwrap()
            .query("SELECT 1")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::QueryRejected { ref body, .. } if body == "broker down"));
    }

    #[tokio::test]
    async fn timeout_is_a_connectivity_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(500))
                    .set_body_json(json!({ "exceptions": [] })),
            )
            .mount(&server)
            .await;

        let mut endpoint = endpoint_for(&server);
        endpoint.timeout = Duration::from_millis(50);

        let err = PinotConnection::connect(&endpoint)
            .unwrap()
            .query("SELECT 1")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Connectivity(ref e) if e.is_timeout()));
    }
}
