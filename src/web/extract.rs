// src/web/extract.rs
use crate::error::{AppError, FieldError};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts, Request,
    },
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

/// Corpo JSON desserializado e validado. Qualquer falha vira `AppError::Validation`.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;

        value
            .validate()
            .map_err(|e| AppError::Validation(field_errors(&e)))?;

        Ok(ValidatedJson(value))
    }
}

/// Parâmetros do caminho com rejeição no formato do envelope.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                AppError::BadRequest("Content-Type deve ser application/json".into())
            }
            JsonRejection::JsonDataError(err) => {
                AppError::Validation(vec![data_error_field(&err.body_text())])
            }
            other => AppError::Validation(vec![FieldError::new("body", other.body_text())]),
        }
    }
}

// "Failed to deserialize ... target type: valor: número inválido: 'abc' at line 1 column 20"
// vira o campo `valor` com a mensagem `número inválido: 'abc'`.
fn data_error_field(text: &str) -> FieldError {
    let detail = text
        .split_once("target type: ")
        .map_or(text, |(_, detail)| detail);
    let detail = detail
        .rfind(" at line ")
        .map_or(detail, |pos| &detail[..pos]);

    if let Some((path, message)) = detail.split_once(": ") {
        let is_path = !path.is_empty()
            && path
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '[' | ']'));
        if is_path {
            return FieldError::new(path, message);
        }
    }

    if let Some(field) = detail
        .strip_prefix("missing field `")
        .and_then(|rest| rest.strip_suffix('`'))
    {
        return FieldError::new(field, "Campo obrigatório");
    }

    FieldError::new("body", detail)
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!("Parâmetro de caminho inválido: {}", rejection.body_text());
        AppError::BadRequest("Parâmetro inválido na URL".into())
    }
}

/// Converte os erros do `validator` em pares campo/mensagem, por ordem de campo.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            // erros de schema vêm em "__all__"
            let field = match field.to_string() {
                f if f == "__all__" => "body".to_string(),
                f => f,
            };
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} inválido", field));
                FieldError::new(field.clone(), message)
            })
        })
        .collect();
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}
