// src/services/access_service.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        patient::Patient,
        user::{CurrentUser, Role},
    },
    services::patient_service,
};
use sqlx::SqlitePool;

pub const ALUNO_NAO_ENCONTRADO: &str = "Aluno não encontrado";

/// Único predicado de autorização: o gestor vê tudo, o profissional só os seus alunos.
pub fn can_access(role: Role, caller_id: i64, owner_id: Option<i64>) -> bool {
    match role {
        Role::Manager => true,
        Role::Practitioner => owner_id == Some(caller_id),
    }
}

/// Filtro a aplicar nas listagens: `None` para o gestor.
pub fn scope_for(user: &CurrentUser) -> Option<i64> {
    match user.role {
        Role::Manager => None,
        Role::Practitioner => Some(user.id),
    }
}

/// Carrega o aluno e verifica o acesso. Primeiro 404, depois 403.
pub async fn authorize_patient(
    db_pool: &SqlitePool,
    user: &CurrentUser,
    patient_id: i64,
    denied_msg: &str,
) -> AppResult<Patient> {
    let patient = patient_service::find_by_id(db_pool, patient_id)
        .await?
        .ok_or_else(|| AppError::not_found(ALUNO_NAO_ENCONTRADO))?;

    if !can_access(user.role, user.id, patient.profissional_id) {
        tracing::warn!(
            "Acesso negado: user {} ({}) ao aluno {}",
            user.id,
            user.role.as_str(),
            patient_id
        );
        return Err(AppError::forbidden(denied_msg));
    }
    Ok(patient)
}

/// Profissional só pode atribuir alunos a si próprio.
pub fn ensure_can_assign(user: &CurrentUser, profissional_id: i64) -> AppResult<()> {
    if can_access(user.role, user.id, Some(profissional_id)) {
        Ok(())
    } else {
        tracing::warn!(
            "User {} tentou atribuir aluno ao profissional {}",
            user.id,
            profissional_id
        );
        Err(AppError::forbidden(
            "Você só pode cadastrar alunos para si mesmo",
        ))
    }
}
