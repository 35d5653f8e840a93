// src/web/mw_errors.rs
use crate::{
    error::{error_response, InternalErrorDetail},
    state::AppState,
};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

/// Com `expose_error_details` ligado, troca a mensagem genérica de um 5xx
/// pelo detalhe anexado em `AppError::into_response`.
pub async fn expose_error_details(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    if !state.config.expose_error_details {
        return response;
    }

    let detail = response
        .extensions()
        .get::<InternalErrorDetail>()
        .map(|InternalErrorDetail(detail)| detail.clone());
    match detail {
        Some(detail) => error_response(response.status(), detail, Vec::new()),
        None => response,
    }
}
