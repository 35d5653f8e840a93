// src/web/evolution_handlers.rs
use crate::{
    error::AppResult,
    models::{
        evolution::{EvaAverage, Evolution, EvolutionPayload},
        user::CurrentUser,
    },
    services::{access_service, evolution_service, user_service},
    state::AppState,
    web::{
        extract::{ApiPath, ValidatedJson},
        response::{ApiResponse, Created},
    },
};
use axum::{
    extract::{Query, State},
    Extension,
};
use serde::Deserialize;

const SEM_PERMISSAO_LEITURA: &str = "Sem permissão para acessar evoluções deste aluno";

#[derive(Debug, Deserialize)]
pub struct LatestParams {
    // texto para que valores inválidos caiam no padrão em vez de dar 400
    pub limit: Option<String>,
}

// GET /patients/{id}/evolutions
pub async fn handle_list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiPath(patient_id): ApiPath<i64>,
) -> AppResult<ApiResponse<Vec<Evolution>>> {
    access_service::authorize_patient(&state.db_pool, &user, patient_id, SEM_PERMISSAO_LEITURA)
        .await?;
    let evolutions = evolution_service::list(&state.db_pool, patient_id).await?;
    Ok(ApiResponse::success(evolutions))
}

// GET /patients/{id}/evolutions/latest?limit=N
pub async fn handle_latest(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiPath(patient_id): ApiPath<i64>,
    Query(params): Query<LatestParams>,
) -> AppResult<ApiResponse<Vec<Evolution>>> {
    access_service::authorize_patient(&state.db_pool, &user, patient_id, SEM_PERMISSAO_LEITURA)
        .await?;
    let limit = evolution_service::normalize_limit(params.limit.as_deref());
    let evolutions = evolution_service::latest(&state.db_pool, patient_id, limit).await?;
    Ok(ApiResponse::success(evolutions))
}

// GET /patients/{id}/evolutions/eva-average
pub async fn handle_eva_average(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiPath(patient_id): ApiPath<i64>,
) -> AppResult<ApiResponse<EvaAverage>> {
    access_service::authorize_patient(
        &state.db_pool,
        &user,
        patient_id,
        "Sem permissão para acessar dados deste aluno",
    )
    .await?;
    let average = evolution_service::eva_average(&state.db_pool, patient_id).await?;
    Ok(ApiResponse::success(average))
}

// POST /patients/{id}/evolutions
pub async fn handle_create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiPath(patient_id): ApiPath<i64>,
    ValidatedJson(payload): ValidatedJson<EvolutionPayload>,
) -> AppResult<Created<Evolution>> {
    access_service::authorize_patient(
        &state.db_pool,
        &user,
        patient_id,
        "Sem permissão para criar evolução para este aluno",
    )
    .await?;

    // Autor = nome de quem regista
    let author = user_service::find_user_by_id(&state.db_pool, user.id)
        .await?
        .map(|u| u.nome);
    let evolution =
        evolution_service::create(&state.db_pool, patient_id, author.as_deref(), &payload).await?;
    Ok(Created(evolution, "Evolução registrada com sucesso"))
}

// PUT /patients/{id}/evolutions/{evo_id}
pub async fn handle_update(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiPath((patient_id, id)): ApiPath<(i64, i64)>,
    ValidatedJson(payload): ValidatedJson<EvolutionPayload>,
) -> AppResult<ApiResponse<Evolution>> {
    access_service::authorize_patient(
        &state.db_pool,
        &user,
        patient_id,
        "Sem permissão para editar evolução deste aluno",
    )
    .await?;
    let evolution = evolution_service::update(&state.db_pool, patient_id, id, &payload).await?;
    Ok(ApiResponse::with_message(evolution, "Evolução atualizada com sucesso"))
}

// DELETE /patients/{id}/evolutions/{evo_id}
pub async fn handle_delete(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiPath((patient_id, id)): ApiPath<(i64, i64)>,
) -> AppResult<ApiResponse<()>> {
    access_service::authorize_patient(
        &state.db_pool,
        &user,
        patient_id,
        "Sem permissão para excluir evolução deste aluno",
    )
    .await?;
    evolution_service::delete(&state.db_pool, patient_id, id).await?;
    Ok(ApiResponse::message("Evolução excluída com sucesso"))
}
