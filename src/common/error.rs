// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Mensagem única mostrada ao usuário para qualquer falha de acesso a dados.
pub const DATA_ACCESS_MESSAGE: &str =
    "Failed to connect to the database. Please check your connection and try again.";

pub const INTERNAL_MESSAGE: &str = "Ocorreu um erro inesperado.";

#[derive(Debug, Error)]
pub enum AppError {
    // Rede, DNS, timeout do cliente...
    #[error("Falha de conexão com o broker: {0}")]
    Connectivity(#[from] reqwest::Error),

    #[error("Broker recusou a consulta ({status}): {body}")]
    QueryRejected { status: StatusCode, body: String },

    #[error("Broker retornou exceções: {0}")]
    QueryExceptions(String),

    #[error("Resposta inválida do broker: {0}")]
    InvalidResponse(String),

    #[error("Filtro inválido: {0}")]
    InvalidFilter(String),

    // Falhas locais: template, desenho de gráfico...
    #[error("Erro interno: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    /// Tudo que acontece entre abrir a conexão e decodificar as linhas.
    pub fn is_data_access(&self) -> bool {
        matches!(
            self,
            AppError::Connectivity(_)
                | AppError::QueryRejected { .. }
                | AppError::QueryExceptions(_)
                | AppError::InvalidResponse(_)
        )
    }

    // Rede, autenticação e SQL malformado colapsam na mesma mensagem.
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidFilter(msg) => msg.clone(),
            AppError::InternalServerError(_) => INTERNAL_MESSAGE.to_string(),
            _ => DATA_ACCESS_MESSAGE.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::InvalidFilter(_) => StatusCode::BAD_REQUEST,
            AppError::InternalServerError(ref e) => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ref e => {
                tracing::error!("Falha no acesso a dados: {}", e);
                StatusCode::BAD_GATEWAY
            }
        };

        let body = Json(json!({ "error": self.user_message() }));
        (status, body).into_response()
    }
}
