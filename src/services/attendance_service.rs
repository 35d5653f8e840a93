// src/services/attendance_service.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        attendance::{Attendance, AttendancePayload},
        stats::AttendanceStats,
    },
};
use chrono::NaiveDate;
use sqlx::SqlitePool;

pub const FREQUENCIA_DUPLICADA: &str = "Já existe um registro de frequência para esta data";
pub const FREQUENCIA_NAO_ENCONTRADA: &str = "Registro de frequência não encontrado";

/// Frequências de um aluno, mais recentes primeiro.
pub async fn list(db_pool: &SqlitePool, patient_id: i64) -> AppResult<Vec<Attendance>> {
    let records = sqlx::query_as::<_, Attendance>(
        "SELECT * FROM attendance WHERE patient_id = ?1 ORDER BY date DESC, id DESC",
    )
    .bind(patient_id)
    .fetch_all(db_pool)
    .await?;
    tracing::debug!("{} frequências para o aluno {}", records.len(), patient_id);
    Ok(records)
}

/// Registo pelo ID, desde que pertença ao aluno indicado.
pub async fn find_for_patient(
    db_pool: &SqlitePool,
    patient_id: i64,
    id: i64,
) -> AppResult<Attendance> {
    sqlx::query_as::<_, Attendance>("SELECT * FROM attendance WHERE id = ?1 AND patient_id = ?2")
        .bind(id)
        .bind(patient_id)
        .fetch_optional(db_pool)
        .await?
        .ok_or_else(|| AppError::not_found(FREQUENCIA_NAO_ENCONTRADA))
}

/// Já existe outro registo do aluno nesta data? `exclude_id` ignora o próprio registo.
pub async fn has_duplicate(
    db_pool: &SqlitePool,
    patient_id: i64,
    date: NaiveDate,
    exclude_id: Option<i64>,
) -> AppResult<bool> {
    let exists: i64 = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM attendance
            WHERE patient_id = ?1 AND date = ?2 AND (?3 IS NULL OR id != ?3)
        )
        "#,
    )
    .bind(patient_id)
    .bind(date)
    .bind(exclude_id)
    .fetch_one(db_pool)
    .await?;
    Ok(exists != 0)
}

// A restrição UNIQUE apanha o que escapar à verificação prévia
fn map_duplicate(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::conflict(FREQUENCIA_DUPLICADA)
        }
        _ => AppError::from(err),
    }
}

pub async fn create(
    db_pool: &SqlitePool,
    patient_id: i64,
    payload: &AttendancePayload,
) -> AppResult<Attendance> {
    if has_duplicate(db_pool, patient_id, payload.date, None).await? {
        tracing::warn!(
            "Frequência duplicada para aluno {} em {}",
            patient_id,
            payload.date
        );
        return Err(AppError::conflict(FREQUENCIA_DUPLICADA));
    }

    let record = sqlx::query_as::<_, Attendance>(
        r#"
        INSERT INTO attendance (patient_id, date, status, notes)
        VALUES (?1, ?2, ?3, ?4)
        RETURNING *
        "#,
    )
    .bind(patient_id)
    .bind(payload.date)
    .bind(payload.status)
    .bind(payload.notes())
    .fetch_one(db_pool)
    .await
    .map_err(map_duplicate)?;

    tracing::info!(
        "✅ Frequência {} registada para aluno {} ({:?}).",
        record.id,
        patient_id,
        record.status
    );
    Ok(record)
}

pub async fn update(
    db_pool: &SqlitePool,
    patient_id: i64,
    id: i64,
    payload: &AttendancePayload,
) -> AppResult<Attendance> {
    find_for_patient(db_pool, patient_id, id).await?;

    if has_duplicate(db_pool, patient_id, payload.date, Some(id)).await? {
        tracing::warn!(
            "Frequência duplicada para aluno {} em {} (update {})",
            patient_id,
            payload.date,
            id
        );
        return Err(AppError::conflict(FREQUENCIA_DUPLICADA));
    }

    let record = sqlx::query_as::<_, Attendance>(
        r#"
        UPDATE attendance SET date = ?1, status = ?2, notes = ?3
        WHERE id = ?4 AND patient_id = ?5
        RETURNING *
        "#,
    )
    .bind(payload.date)
    .bind(payload.status)
    .bind(payload.notes())
    .bind(id)
    .bind(patient_id)
    .fetch_optional(db_pool)
    .await
    .map_err(map_duplicate)?
    .ok_or_else(|| AppError::not_found(FREQUENCIA_NAO_ENCONTRADA))?;

    tracing::info!("Frequência {} atualizada.", id);
    Ok(record)
}

pub async fn delete(db_pool: &SqlitePool, patient_id: i64, id: i64) -> AppResult<()> {
    let rows_affected = sqlx::query("DELETE FROM attendance WHERE id = ?1 AND patient_id = ?2")
        .bind(id)
        .bind(patient_id)
        .execute(db_pool)
        .await?
        .rows_affected();

    if rows_affected == 0 {
        return Err(AppError::not_found(FREQUENCIA_NAO_ENCONTRADA));
    }
    tracing::info!("🗑️ Frequência {} excluída.", id);
    Ok(())
}

pub async fn stats(db_pool: &SqlitePool, patient_id: i64) -> AppResult<AttendanceStats> {
    let (present, absent, makeup): (i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COALESCE(SUM(CASE WHEN status = 'present' THEN 1 ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN status = 'absent' THEN 1 ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN status = 'makeup' THEN 1 ELSE 0 END), 0)
        FROM attendance
        WHERE patient_id = ?1
        "#,
    )
    .bind(patient_id)
    .fetch_one(db_pool)
    .await?;

    Ok(AttendanceStats::from_counts(present, absent, makeup))
}
