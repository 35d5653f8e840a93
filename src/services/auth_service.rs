// src/services/auth_service.rs
use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::user::{CurrentUser, LoginResponse, Role, User},
    services::user_service,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// Conteúdo do token JWT.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.user_id,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// Verifica se a senha fornecida corresponde ao hash guardado.
pub async fn verify_password(password: &str, stored_hash: &str) -> AppResult<bool> {
    let password = password.to_string();
    let stored_hash = stored_hash.to_string();
    tokio::task::spawn_blocking(move || bcrypt::verify(&password, &stored_hash))
        .await
        .map_err(|e| {
            tracing::error!("Erro na task spawn_blocking (verify_password): {:?}", e);
            AppError::internal("falha ao verificar senha")
        })?
        .map_err(|e| {
            tracing::error!("Erro bcrypt ao verificar senha: {:?}", e);
            AppError::PasswordHashingError
        })
}

/// Gera um hash bcrypt para uma senha.
pub async fn hash_password(password: &str, cost: u32) -> AppResult<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(&password, cost))
        .await
        .map_err(|e| {
            tracing::error!("Erro na task spawn_blocking (hash_password): {:?}", e);
            AppError::internal("falha ao gerar hash")
        })?
        .map_err(|e| {
            tracing::error!("Erro bcrypt ao gerar hash: {:?}", e);
            AppError::PasswordHashingError
        })
}

/// Emite um token assinado para o utilizador.
pub fn issue_token(config: &Config, user: &User) -> AppResult<String> {
    let now = Utc::now();
    let claims = Claims {
        user_id: user.id,
        email: user.email.clone(),
        role: user.role,
        iat: now.timestamp(),
        exp: (now + Duration::hours(config.jwt_expiration_hours)).timestamp(),
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?)
}

/// Valida a assinatura e a expiração do token.
pub fn verify_token(config: &Config, token: &str) -> AppResult<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// Login por email e senha. Utilizador inexistente e senha errada dão o mesmo erro.
pub async fn login(
    db_pool: &SqlitePool,
    config: &Config,
    email: &str,
    senha: &str,
) -> AppResult<LoginResponse> {
    tracing::info!("Tentativa de login para: {}", email);

    let user = match user_service::find_user_by_email(db_pool, email).await? {
        Some(user) => user,
        None => {
            tracing::warn!("Utilizador não encontrado: {}", email);
            return Err(AppError::InvalidCredentials);
        }
    };

    if !verify_password(senha, &user.senha).await? {
        tracing::warn!("Senha incorreta para: {}", email);
        return Err(AppError::InvalidCredentials);
    }

    let token = issue_token(config, &user)?;
    tracing::info!("✅ Login bem-sucedido para: {}", user.email);
    Ok(LoginResponse { token, user })
}

/// Troca a senha do próprio utilizador, confirmando a atual.
pub async fn change_password(
    db_pool: &SqlitePool,
    config: &Config,
    user_id: i64,
    senha_atual: &str,
    nova_senha: &str,
) -> AppResult<()> {
    let user = user_service::find_user_by_id(db_pool, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Usuário não encontrado"))?;

    if !verify_password(senha_atual, &user.senha).await? {
        tracing::warn!("Senha atual incorreta para user {}", user_id);
        return Err(AppError::validation("senhaAtual", "Senha atual incorreta"));
    }

    user_service::update_user_password(db_pool, user_id, nova_senha, config.bcrypt_cost).await
}
