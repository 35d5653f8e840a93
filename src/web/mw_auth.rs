// src/web/mw_auth.rs
use crate::{
    error::AppError,
    models::user::CurrentUser,
    services::auth_service,
    state::AppState,
};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

// Middleware que exige um token Bearer válido
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = match bearer_token(request.headers()) {
        Some(token) => token,
        None => {
            tracing::debug!("Autenticação MW: pedido sem token para {}", request.uri());
            return Err(AppError::Unauthorized);
        }
    };

    let claims = auth_service::verify_token(&state.config, token).map_err(|e| {
        tracing::debug!("Autenticação MW: token rejeitado: {}", e);
        e
    })?;

    tracing::debug!(
        "Autenticação MW: utilizador {} ({}) autenticado.",
        claims.user_id,
        claims.role.as_str()
    );

    // Os handlers protegidos leem o utilizador das extensões
    request.extensions_mut().insert(CurrentUser::from(claims));
    Ok(next.run(request).await)
}

/// Token do cabeçalho `Authorization: Bearer <token>`.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }
    Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extrai_token_bearer() {
        assert_eq!(bearer_token(&headers("Bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(&headers("bearer abc")), Some("abc"));
    }

    #[test]
    fn ignora_outros_esquemas_e_vazios() {
        assert_eq!(bearer_token(&headers("Basic dXNlcg==")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&headers("abc")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
