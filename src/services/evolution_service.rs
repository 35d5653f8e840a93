// src/services/evolution_service.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        evolution::{EvaAverage, Evolution, EvolutionPayload},
        stats::round2,
    },
};
use chrono::Utc;
use sqlx::{types::Json, SqlitePool};

pub const EVOLUCAO_NAO_ENCONTRADA: &str = "Evolução não encontrada";
pub const AUTOR_DESCONHECIDO: &str = "Desconhecido";

pub const LATEST_DEFAULT: i64 = 5;
pub const LATEST_MAX: i64 = 100;

/// Normaliza o `limit` pedido: ausente, inválido ou <= 0 dá o padrão; acima do máximo é cortado.
pub fn normalize_limit(raw: Option<&str>) -> i64 {
    match raw.and_then(|s| s.trim().parse::<i64>().ok()) {
        Some(n) if n > 0 => n.min(LATEST_MAX),
        _ => LATEST_DEFAULT,
    }
}

pub async fn list(db_pool: &SqlitePool, patient_id: i64) -> AppResult<Vec<Evolution>> {
    let evolutions = sqlx::query_as::<_, Evolution>(
        "SELECT * FROM evolutions WHERE patient_id = ?1 ORDER BY date DESC, id DESC",
    )
    .bind(patient_id)
    .fetch_all(db_pool)
    .await?;
    tracing::debug!("{} evoluções para o aluno {}", evolutions.len(), patient_id);
    Ok(evolutions)
}

/// As `limit` evoluções mais recentes.
pub async fn latest(db_pool: &SqlitePool, patient_id: i64, limit: i64) -> AppResult<Vec<Evolution>> {
    let evolutions = sqlx::query_as::<_, Evolution>(
        "SELECT * FROM evolutions WHERE patient_id = ?1 ORDER BY date DESC, id DESC LIMIT ?2",
    )
    .bind(patient_id)
    .bind(limit)
    .fetch_all(db_pool)
    .await?;
    Ok(evolutions)
}

pub async fn find_for_patient(
    db_pool: &SqlitePool,
    patient_id: i64,
    id: i64,
) -> AppResult<Evolution> {
    sqlx::query_as::<_, Evolution>("SELECT * FROM evolutions WHERE id = ?1 AND patient_id = ?2")
        .bind(id)
        .bind(patient_id)
        .fetch_optional(db_pool)
        .await?
        .ok_or_else(|| AppError::not_found(EVOLUCAO_NAO_ENCONTRADA))
}

/// Regista uma evolução. Sem data usa-se o momento atual (UTC).
pub async fn create(
    db_pool: &SqlitePool,
    patient_id: i64,
    author: Option<&str>,
    payload: &EvolutionPayload,
) -> AppResult<Evolution> {
    let date = payload.date.unwrap_or_else(|| Utc::now().naive_utc());
    let author = author
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .unwrap_or(AUTOR_DESCONHECIDO);

    let evolution = sqlx::query_as::<_, Evolution>(
        r#"
        INSERT INTO evolutions (patient_id, date, eva, exercises, notes, author)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        RETURNING *
        "#,
    )
    .bind(patient_id)
    .bind(date)
    .bind(payload.eva)
    .bind(Json(&payload.exercises))
    .bind(payload.notes.trim())
    .bind(author)
    .fetch_one(db_pool)
    .await?;

    tracing::info!(
        "✅ Evolução {} registada para aluno {} por {}.",
        evolution.id,
        patient_id,
        author
    );
    Ok(evolution)
}

/// Substitui data, EVA, exercícios e notas. O autor mantém-se.
pub async fn update(
    db_pool: &SqlitePool,
    patient_id: i64,
    id: i64,
    payload: &EvolutionPayload,
) -> AppResult<Evolution> {
    let date = payload
        .date
        .ok_or_else(|| AppError::validation("date", "Data é obrigatória"))?;

    find_for_patient(db_pool, patient_id, id).await?;

    sqlx::query(
        r#"
        UPDATE evolutions SET date = ?1, eva = ?2, exercises = ?3, notes = ?4
        WHERE id = ?5 AND patient_id = ?6
        "#,
    )
    .bind(date)
    .bind(payload.eva)
    .bind(Json(&payload.exercises))
    .bind(payload.notes.trim())
    .bind(id)
    .bind(patient_id)
    .execute(db_pool)
    .await?;

    tracing::info!("Evolução {} atualizada.", id);
    // Reler para apanhar o updated_at do trigger
    find_for_patient(db_pool, patient_id, id).await
}

pub async fn delete(db_pool: &SqlitePool, patient_id: i64, id: i64) -> AppResult<()> {
    let rows_affected = sqlx::query("DELETE FROM evolutions WHERE id = ?1 AND patient_id = ?2")
        .bind(id)
        .bind(patient_id)
        .execute(db_pool)
        .await?
        .rows_affected();

    if rows_affected == 0 {
        return Err(AppError::not_found(EVOLUCAO_NAO_ENCONTRADA));
    }
    tracing::info!("🗑️ Evolução {} excluída.", id);
    Ok(())
}

/// Média das EVA registadas (ignora as nulas).
pub async fn eva_average(db_pool: &SqlitePool, patient_id: i64) -> AppResult<EvaAverage> {
    let average: Option<f64> = sqlx::query_scalar(
        "SELECT AVG(CAST(eva AS REAL)) FROM evolutions WHERE patient_id = ?1 AND eva IS NOT NULL",
    )
    .bind(patient_id)
    .fetch_one(db_pool)
    .await?;

    Ok(EvaAverage {
        average_eva: average.map(round2),
    })
}
