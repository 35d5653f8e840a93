// src/web/mw_admin.rs
use crate::{error::AppError, models::user::CurrentUser};
use axum::{extract::Request, middleware::Next, response::Response, Extension};

/// Só deixa passar o gestor.
/// Deve ser executado *depois* do middleware `require_auth`.
pub async fn require_manager(
    Extension(user): Extension<CurrentUser>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !user.is_manager() {
        tracing::warn!("Gestor MW: acesso negado para user {}.", user.id);
        return Err(AppError::forbidden(
            "Acesso negado. Apenas gestores podem realizar esta ação",
        ));
    }
    tracing::debug!("Gestor MW: acesso concedido para user {}.", user.id);
    Ok(next.run(request).await)
}
