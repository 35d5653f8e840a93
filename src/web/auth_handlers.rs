// src/web/auth_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::user::{
        CurrentUser, LoginRequest, LoginResponse, ProfessionalOption, RegisterRequest,
        UpdatePasswordRequest, User,
    },
    services::{auth_service, user_service},
    state::AppState,
    web::{
        extract::ValidatedJson,
        response::{ApiResponse, Created},
    },
};
use axum::{extract::State, Extension};

// POST /auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> AppResult<ApiResponse<LoginResponse>> {
    let response = auth_service::login(&state.db_pool, &state.config, &req.email, &req.senha).await?;
    Ok(ApiResponse::with_message(response, "Login realizado com sucesso"))
}

// GET /auth/me
pub async fn handle_me(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<ApiResponse<User>> {
    let user = user_service::find_user_by_id(&state.db_pool, user.id)
        .await?
        .ok_or_else(|| AppError::not_found("Usuário não encontrado"))?;
    Ok(ApiResponse::success(user))
}

// PUT /auth/password
pub async fn handle_change_password(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(req): ValidatedJson<UpdatePasswordRequest>,
) -> AppResult<ApiResponse<()>> {
    auth_service::change_password(
        &state.db_pool,
        &state.config,
        user.id,
        &req.senha_atual,
        &req.nova_senha,
    )
    .await?;
    Ok(ApiResponse::message("Senha atualizada com sucesso"))
}

// POST /auth/register (só gestor)
pub async fn handle_register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> AppResult<Created<User>> {
    let user = user_service::create_user(
        &state.db_pool,
        &req.nome,
        &req.email,
        &req.senha,
        req.role,
        state.config.bcrypt_cost,
    )
    .await?;
    Ok(Created(user, "Usuário criado com sucesso"))
}

// GET /auth/professionals
pub async fn handle_list_professional_options(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<ProfessionalOption>>> {
    let options = user_service::list_professional_options(&state.db_pool).await?;
    Ok(ApiResponse::success(options))
}
