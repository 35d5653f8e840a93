// src/services/patient_service.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        patient::{Patient, PatientDetails, PatientRecord, PatientSummary},
        stats::PatientStats,
    },
    services::{
        access_service::ALUNO_NAO_ENCONTRADO, attendance_service, evolution_service, user_service,
    },
};
use sqlx::{types::Json, SqlitePool};

const SELECT_PATIENT: &str = r#"
    SELECT p.*, u.nome AS profissional_nome
    FROM patients p
    LEFT JOIN users u ON u.id = p.profissional_id
"#;

/// Lista de alunos, mais recentes primeiro. `scope` restringe a um profissional.
pub async fn list(db_pool: &SqlitePool, scope: Option<i64>) -> AppResult<Vec<PatientSummary>> {
    tracing::debug!("Listando alunos (escopo: {:?})", scope);
    let patients = sqlx::query_as::<_, PatientSummary>(
        r#"
        SELECT
            p.*,
            u.nome AS profissional_nome,
            (SELECT COUNT(*) FROM attendance a WHERE a.patient_id = p.id) AS total_attendance,
            (SELECT COUNT(*) FROM evolutions e WHERE e.patient_id = p.id) AS total_evolutions
        FROM patients p
        LEFT JOIN users u ON u.id = p.profissional_id
        WHERE (?1 IS NULL OR p.profissional_id = ?1)
        ORDER BY p.created_at DESC, p.id DESC
        "#,
    )
    .bind(scope)
    .fetch_all(db_pool)
    .await?;
    Ok(patients)
}

pub async fn find_by_id(db_pool: &SqlitePool, id: i64) -> AppResult<Option<Patient>> {
    tracing::debug!("Buscando aluno por ID: {}", id);
    let patient = sqlx::query_as::<_, Patient>(&format!("{} WHERE p.id = ?1", SELECT_PATIENT))
        .bind(id)
        .fetch_optional(db_pool)
        .await?;
    Ok(patient)
}

/// Aluno com todas as frequências e evoluções.
pub async fn details(db_pool: &SqlitePool, patient: Patient) -> AppResult<PatientDetails> {
    let attendance = attendance_service::list(db_pool, patient.id).await?;
    let evolutions = evolution_service::list(db_pool, patient.id).await?;
    Ok(PatientDetails {
        patient,
        attendance,
        evolutions,
    })
}

// O profissional indicado tem de existir e ter role `profissional`
async fn ensure_professional(db_pool: &SqlitePool, profissional_id: i64) -> AppResult<()> {
    if user_service::find_professional(db_pool, profissional_id)
        .await?
        .is_none()
    {
        return Err(AppError::validation(
            "profissional_id",
            "Profissional não encontrado",
        ));
    }
    Ok(())
}

pub async fn create(db_pool: &SqlitePool, record: &PatientRecord) -> AppResult<Patient> {
    tracing::info!("Criando aluno '{}'", record.nome);
    ensure_professional(db_pool, record.profissional_id).await?;

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO patients
            (nome, profissional_id, dias, horarios, valor, porcentagem, base, ganho,
             ganho_fixo, tipo, data_inicio, data_fim)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        RETURNING id
        "#,
    )
    .bind(&record.nome)
    .bind(record.profissional_id)
    .bind(Json(&record.dias))
    .bind(Json(&record.horarios))
    .bind(record.valor)
    .bind(record.porcentagem)
    .bind(record.base)
    .bind(record.ganho)
    .bind(record.ganho_fixo)
    .bind(record.tipo)
    .bind(record.data_inicio)
    .bind(record.data_fim)
    .fetch_one(db_pool)
    .await?;

    tracing::info!("✅ Aluno {} criado (ganho {:.2}).", id, record.ganho);
    find_by_id(db_pool, id)
        .await?
        .ok_or_else(|| AppError::internal("aluno criado não encontrado"))
}

/// Substitui todos os campos editáveis; base e ganho são recalculados antes.
pub async fn update(db_pool: &SqlitePool, id: i64, record: &PatientRecord) -> AppResult<Patient> {
    tracing::info!("Atualizando aluno {}", id);
    ensure_professional(db_pool, record.profissional_id).await?;

    let rows_affected = sqlx::query(
        r#"
        UPDATE patients SET
            nome = ?1, profissional_id = ?2, dias = ?3, horarios = ?4, valor = ?5,
            porcentagem = ?6, base = ?7, ganho = ?8, ganho_fixo = ?9, tipo = ?10,
            data_inicio = ?11, data_fim = ?12
        WHERE id = ?13
        "#,
    )
    .bind(&record.nome)
    .bind(record.profissional_id)
    .bind(Json(&record.dias))
    .bind(Json(&record.horarios))
    .bind(record.valor)
    .bind(record.porcentagem)
    .bind(record.base)
    .bind(record.ganho)
    .bind(record.ganho_fixo)
    .bind(record.tipo)
    .bind(record.data_inicio)
    .bind(record.data_fim)
    .bind(id)
    .execute(db_pool)
    .await?
    .rows_affected();

    if rows_affected == 0 {
        return Err(AppError::not_found(ALUNO_NAO_ENCONTRADO));
    }
    find_by_id(db_pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(ALUNO_NAO_ENCONTRADO))
}

/// Apaga o aluno; frequências e evoluções vão em cascata.
pub async fn delete(db_pool: &SqlitePool, id: i64) -> AppResult<()> {
    let rows_affected = sqlx::query("DELETE FROM patients WHERE id = ?1")
        .bind(id)
        .execute(db_pool)
        .await?
        .rows_affected();

    if rows_affected == 0 {
        return Err(AppError::not_found(ALUNO_NAO_ENCONTRADO));
    }
    tracing::info!("🗑️ Aluno {} excluído.", id);
    Ok(())
}

/// Resumo de alunos, ganhos e presenças. Cada aluno conta uma só vez no ganho.
pub async fn stats(db_pool: &SqlitePool, scope: Option<i64>) -> AppResult<PatientStats> {
    let (total_alunos, ganho_total, presencas, faltas): (i64, f64, i64, i64) = sqlx::query_as(
        r#"
        SELECT
            (SELECT COUNT(*) FROM patients p
                WHERE (?1 IS NULL OR p.profissional_id = ?1)),
            (SELECT CAST(COALESCE(SUM(p.ganho), 0) AS REAL) FROM patients p
                WHERE (?1 IS NULL OR p.profissional_id = ?1)),
            (SELECT COUNT(*) FROM attendance a JOIN patients p ON p.id = a.patient_id
                WHERE a.status = 'present' AND (?1 IS NULL OR p.profissional_id = ?1)),
            (SELECT COUNT(*) FROM attendance a JOIN patients p ON p.id = a.patient_id
                WHERE a.status = 'absent' AND (?1 IS NULL OR p.profissional_id = ?1))
        "#,
    )
    .bind(scope)
    .fetch_one(db_pool)
    .await?;

    Ok(PatientStats::from_counts(total_alunos, ganho_total, presencas, faltas))
}
