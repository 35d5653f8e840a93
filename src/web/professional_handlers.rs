// src/web/professional_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::user::{
        CreateProfessionalRequest, ProfessionalSummary, Role, UpdateProfessionalRequest, User,
    },
    services::user_service,
    state::AppState,
    web::{
        extract::{ApiPath, ValidatedJson},
        response::{ApiResponse, Created},
    },
};
use axum::extract::State;

const PROFISSIONAL_NAO_ENCONTRADO: &str = "Profissional não encontrado";

// GET /professionals
pub async fn handle_list(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<ProfessionalSummary>>> {
    let professionals = user_service::find_all_professionals(&state.db_pool).await?;
    Ok(ApiResponse::success(professionals))
}

// GET /professionals/{id}
pub async fn handle_get(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<ApiResponse<User>> {
    let professional = user_service::find_professional(&state.db_pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(PROFISSIONAL_NAO_ENCONTRADO))?;
    Ok(ApiResponse::success(professional))
}

// POST /professionals
pub async fn handle_create(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateProfessionalRequest>,
) -> AppResult<Created<User>> {
    let user = user_service::create_user(
        &state.db_pool,
        &req.nome,
        &req.email,
        &req.senha,
        Role::Practitioner,
        state.config.bcrypt_cost,
    )
    .await?;
    Ok(Created(user, "Profissional criado com sucesso"))
}

// PUT /professionals/{id}
pub async fn handle_update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ValidatedJson(req): ValidatedJson<UpdateProfessionalRequest>,
) -> AppResult<ApiResponse<User>> {
    let nova_senha = req.nova_senha();
    if nova_senha.is_some_and(|s| s.chars().count() < 6) {
        return Err(AppError::validation(
            "senha",
            "Senha deve ter no mínimo 6 caracteres",
        ));
    }

    let user = user_service::update_professional(
        &state.db_pool,
        id,
        &req.nome,
        &req.email,
        nova_senha,
        state.config.bcrypt_cost,
    )
    .await?;
    Ok(ApiResponse::with_message(user, "Profissional atualizado com sucesso"))
}

// DELETE /professionals/{id}
pub async fn handle_delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<ApiResponse<()>> {
    user_service::delete_professional(&state.db_pool, id).await?;
    Ok(ApiResponse::message("Profissional excluído com sucesso"))
}
