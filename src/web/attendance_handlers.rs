// src/web/attendance_handlers.rs
use crate::{
    error::AppResult,
    models::{
        attendance::{Attendance, AttendancePayload},
        stats::AttendanceStats,
        user::CurrentUser,
    },
    services::{access_service, attendance_service},
    state::AppState,
    web::{
        extract::{ApiPath, ValidatedJson},
        response::{ApiResponse, Created},
    },
};
use axum::{extract::State, Extension};

// GET /patients/{id}/attendance
pub async fn handle_list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiPath(patient_id): ApiPath<i64>,
) -> AppResult<ApiResponse<Vec<Attendance>>> {
    access_service::authorize_patient(
        &state.db_pool,
        &user,
        patient_id,
        "Sem permissão para acessar frequências deste aluno",
    )
    .await?;
    let records = attendance_service::list(&state.db_pool, patient_id).await?;
    Ok(ApiResponse::success(records))
}

// POST /patients/{id}/attendance
pub async fn handle_create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiPath(patient_id): ApiPath<i64>,
    ValidatedJson(payload): ValidatedJson<AttendancePayload>,
) -> AppResult<Created<Attendance>> {
    access_service::authorize_patient(
        &state.db_pool,
        &user,
        patient_id,
        "Sem permissão para registrar frequência deste aluno",
    )
    .await?;
    let record = attendance_service::create(&state.db_pool, patient_id, &payload).await?;
    Ok(Created(record, "Frequência registrada com sucesso"))
}

// PUT /patients/{id}/attendance/{att_id}
pub async fn handle_update(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiPath((patient_id, id)): ApiPath<(i64, i64)>,
    ValidatedJson(payload): ValidatedJson<AttendancePayload>,
) -> AppResult<ApiResponse<Attendance>> {
    access_service::authorize_patient(
        &state.db_pool,
        &user,
        patient_id,
        "Sem permissão para editar frequência deste aluno",
    )
    .await?;
    let record = attendance_service::update(&state.db_pool, patient_id, id, &payload).await?;
    Ok(ApiResponse::with_message(record, "Frequência atualizada com sucesso"))
}

// DELETE /patients/{id}/attendance/{att_id}
pub async fn handle_delete(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiPath((patient_id, id)): ApiPath<(i64, i64)>,
) -> AppResult<ApiResponse<()>> {
    access_service::authorize_patient(
        &state.db_pool,
        &user,
        patient_id,
        "Sem permissão para excluir frequência deste aluno",
    )
    .await?;
    attendance_service::delete(&state.db_pool, patient_id, id).await?;
    Ok(ApiResponse::message("Frequência excluída com sucesso"))
}

// GET /patients/{id}/attendance/stats
pub async fn handle_stats(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiPath(patient_id): ApiPath<i64>,
) -> AppResult<ApiResponse<AttendanceStats>> {
    access_service::authorize_patient(
        &state.db_pool,
        &user,
        patient_id,
        "Sem permissão para acessar estatísticas deste aluno",
    )
    .await?;
    let stats = attendance_service::stats(&state.db_pool, patient_id).await?;
    Ok(ApiResponse::success(stats))
}
