// src/error.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use sqlx::error::ErrorKind;
use thiserror::Error;

/// Detalhe de um erro 5xx, anexado às extensões da resposta.
/// Só chega ao cliente em desenvolvimento (ver `web::mw_errors`).
#[derive(Debug, Clone)]
pub struct InternalErrorDetail(pub String);

/// Erro de validação de um campo do corpo do pedido.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Erro na base de dados: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Erro de migração da base de dados: {0}")]
    SqlxMigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Erro de configuração: {0}")]
    Config(String),

    #[error("Erro ao processar password")]
    PasswordHashingError,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token não fornecido ou inválido")]
    Unauthorized,

    #[error("Token inválido: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Erro de validação")]
    Validation(Vec<FieldError>),

    #[error("Erro interno: {0}")]
    InternalServerError(String),
}

pub type AppResult<T = ()> = Result<T, AppError>;

impl AppError {
    pub fn forbidden(msg: impl Into<String>) -> Self {
        AppError::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::InternalServerError(msg.into())
    }

    /// Erro de validação com um único campo.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation(vec![FieldError::new(field, message)])
    }

    /// Estado HTTP e mensagem visível ao cliente.
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "Erro de validação".into()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Credenciais inválidas".into())
            }
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Token não fornecido ou inválido".into(),
            ),
            AppError::Token(_) => (StatusCode::UNAUTHORIZED, "Token inválido ou expirado".into()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::SqlxError(sqlx::Error::Database(db_err)) => match db_err.kind() {
                ErrorKind::UniqueViolation => (StatusCode::CONFLICT, "Registro duplicado".into()),
                ErrorKind::ForeignKeyViolation => (
                    StatusCode::BAD_REQUEST,
                    "Registro referenciado não existe".into(),
                ),
                ErrorKind::NotNullViolation => {
                    (StatusCode::BAD_REQUEST, "Campo obrigatório ausente".into())
                }
                ErrorKind::CheckViolation => {
                    (StatusCode::BAD_REQUEST, "Valor fora do intervalo permitido".into())
                }
                _ => internal("Erro no banco de dados"),
            },
            AppError::SqlxError(_) | AppError::SqlxMigrateError(_) => {
                internal("Erro no banco de dados")
            }
            AppError::Config(_) => internal("Erro de configuração"),
            AppError::PasswordHashingError => internal("Erro ao processar credenciais"),
            AppError::InternalServerError(_) => internal("Erro interno do servidor"),
        }
    }
}

fn internal(public: &str) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, public.to_string())
}

#[derive(Serialize)]
struct ErrorEnvelope {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<FieldError>,
}

/// Resposta de erro no formato do envelope.
pub fn error_response(status: StatusCode, message: String, errors: Vec<FieldError>) -> Response {
    (
        status,
        Json(ErrorEnvelope {
            success: false,
            message,
            errors,
        }),
    )
        .into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        let detail = if status.is_server_error() {
            tracing::error!("Erro processado: {:?}", self);
            Some(InternalErrorDetail(format!("{}: {}", message, self)))
        } else {
            tracing::debug!("Pedido rejeitado ({}): {}", status, self);
            None
        };

        let errors = match self {
            AppError::Validation(errors) => errors,
            _ => Vec::new(),
        };

        let mut response = error_response(status, message, errors);
        if let Some(detail) = detail {
            response.extensions_mut().insert(detail);
        }
        response
    }
}
