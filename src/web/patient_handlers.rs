// src/web/patient_handlers.rs
use crate::{
    error::AppResult,
    models::{
        patient::{Patient, PatientDetails, PatientPayload, PatientSummary},
        stats::PatientStats,
        user::CurrentUser,
    },
    services::{access_service, patient_service},
    state::AppState,
    web::{
        extract::{ApiPath, ValidatedJson},
        response::{ApiResponse, Created},
    },
};
use axum::{extract::State, Extension};

// GET /patients
pub async fn handle_list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<ApiResponse<Vec<PatientSummary>>> {
    let patients = patient_service::list(&state.db_pool, access_service::scope_for(&user)).await?;
    Ok(ApiResponse::success(patients))
}

// GET /patients/stats
pub async fn handle_stats(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<ApiResponse<PatientStats>> {
    let stats = patient_service::stats(&state.db_pool, access_service::scope_for(&user)).await?;
    Ok(ApiResponse::success(stats))
}

// GET /patients/{id}
pub async fn handle_get(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<ApiResponse<PatientDetails>> {
    let patient = access_service::authorize_patient(
        &state.db_pool,
        &user,
        id,
        "Sem permissão para acessar este aluno",
    )
    .await?;
    let details = patient_service::details(&state.db_pool, patient).await?;
    Ok(ApiResponse::success(details))
}

// POST /patients
pub async fn handle_create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<PatientPayload>,
) -> AppResult<Created<Patient>> {
    access_service::ensure_can_assign(&user, payload.profissional_id)?;
    let patient = patient_service::create(&state.db_pool, &payload.into_record()).await?;
    Ok(Created(patient, "Aluno criado com sucesso"))
}

// PUT /patients/{id}
pub async fn handle_update(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i64>,
    ValidatedJson(payload): ValidatedJson<PatientPayload>,
) -> AppResult<ApiResponse<Patient>> {
    access_service::authorize_patient(
        &state.db_pool,
        &user,
        id,
        "Sem permissão para editar este aluno",
    )
    .await?;
    access_service::ensure_can_assign(&user, payload.profissional_id)?;

    let patient = patient_service::update(&state.db_pool, id, &payload.into_record()).await?;
    Ok(ApiResponse::with_message(patient, "Aluno atualizado com sucesso"))
}

// DELETE /patients/{id}
pub async fn handle_delete(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<ApiResponse<()>> {
    access_service::authorize_patient(
        &state.db_pool,
        &user,
        id,
        "Sem permissão para excluir este aluno",
    )
    .await?;
    patient_service::delete(&state.db_pool, id).await?;
    Ok(ApiResponse::message("Aluno excluído com sucesso"))
}
