// src/services/user_service.rs
use crate::{
    error::{AppError, AppResult},
    models::user::{ProfessionalOption, ProfessionalSummary, Role, User},
    services::auth_service,
};
use sqlx::SqlitePool;

pub const EMAIL_EM_USO: &str = "Este e-mail já está em uso";

pub async fn find_user_by_id(db_pool: &SqlitePool, user_id: i64) -> AppResult<Option<User>> {
    tracing::debug!("Buscando utilizador por ID: {}", user_id);
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?1")
        .bind(user_id)
        .fetch_optional(db_pool)
        .await?;
    Ok(user)
}

pub async fn find_user_by_email(db_pool: &SqlitePool, email: &str) -> AppResult<Option<User>> {
    tracing::debug!("Buscando utilizador por email: {}", email);
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?1")
        .bind(email.trim())
        .fetch_optional(db_pool)
        .await?;
    Ok(user)
}

/// Verifica se o email já pertence a outro utilizador (ignora `exclude_id`).
pub async fn email_exists(
    db_pool: &SqlitePool,
    email: &str,
    exclude_id: Option<i64>,
) -> AppResult<bool> {
    let exists: i64 = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1 AND (?2 IS NULL OR id != ?2))",
    )
    .bind(email.trim())
    .bind(exclude_id)
    .fetch_one(db_pool)
    .await?;
    Ok(exists != 0)
}

/// Profissional (role `profissional`) pelo ID.
pub async fn find_professional(db_pool: &SqlitePool, id: i64) -> AppResult<Option<User>> {
    Ok(find_user_by_id(db_pool, id)
        .await?
        .filter(|u| u.role == Role::Practitioner))
}

pub async fn create_user(
    db_pool: &SqlitePool,
    nome: &str,
    email: &str,
    raw_password: &str,
    role: Role,
    bcrypt_cost: u32,
) -> AppResult<User> {
    tracing::info!("Tentando criar utilizador: {}", email);

    if email_exists(db_pool, email, None).await? {
        tracing::warn!("Falha ao criar user: email '{}' já existe.", email);
        return Err(AppError::conflict(EMAIL_EM_USO));
    }

    let password_hash = auth_service::hash_password(raw_password, bcrypt_cost).await?;

    // Uma corrida até aqui acaba em UNIQUE violation -> 409
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (nome, email, senha, role)
        VALUES (?1, ?2, ?3, ?4)
        RETURNING *
        "#,
    )
    .bind(nome.trim())
    .bind(email.trim())
    .bind(password_hash)
    .bind(role)
    .fetch_one(db_pool)
    .await?;

    tracing::info!("✅ Utilizador '{}' criado com sucesso (id {}).", user.email, user.id);
    Ok(user)
}

/// Atualiza nome/email e, se vier, a senha. O role não muda.
pub async fn update_professional(
    db_pool: &SqlitePool,
    id: i64,
    nome: &str,
    email: &str,
    nova_senha: Option<&str>,
    bcrypt_cost: u32,
) -> AppResult<User> {
    tracing::info!("Atualizando dados para profissional: {}", id);

    if find_professional(db_pool, id).await?.is_none() {
        return Err(AppError::not_found("Profissional não encontrado"));
    }
    if email_exists(db_pool, email, Some(id)).await? {
        return Err(AppError::conflict(EMAIL_EM_USO));
    }

    sqlx::query("UPDATE users SET nome = ?1, email = ?2 WHERE id = ?3")
        .bind(nome.trim())
        .bind(email.trim())
        .bind(id)
        .execute(db_pool)
        .await?;

    if let Some(senha) = nova_senha {
        update_user_password(db_pool, id, senha, bcrypt_cost).await?;
    }

    find_user_by_id(db_pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Profissional não encontrado"))
}

pub async fn update_user_password(
    db_pool: &SqlitePool,
    user_id: i64,
    new_raw_password: &str,
    bcrypt_cost: u32,
) -> AppResult<()> {
    tracing::info!("Tentando alterar senha para user: {}", user_id);
    let new_password_hash = auth_service::hash_password(new_raw_password, bcrypt_cost).await?;

    let rows_affected = sqlx::query("UPDATE users SET senha = ?1 WHERE id = ?2")
        .bind(new_password_hash)
        .bind(user_id)
        .execute(db_pool)
        .await?
        .rows_affected();

    if rows_affected == 0 {
        tracing::warn!("Falha ao alterar senha: Utilizador '{}' não encontrado.", user_id);
        return Err(AppError::not_found("Usuário não encontrado"));
    }
    tracing::info!("✅ Senha alterada com sucesso para user: {}", user_id);
    Ok(())
}

pub async fn has_patients(db_pool: &SqlitePool, user_id: i64) -> AppResult<bool> {
    let total: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM patients WHERE profissional_id = ?1")
            .bind(user_id)
            .fetch_one(db_pool)
            .await?;
    Ok(total > 0)
}

/// Apaga um profissional sem alunos vinculados.
pub async fn delete_professional(db_pool: &SqlitePool, id: i64) -> AppResult<()> {
    if find_professional(db_pool, id).await?.is_none() {
        return Err(AppError::not_found("Profissional não encontrado"));
    }
    if has_patients(db_pool, id).await? {
        tracing::warn!("Exclusão bloqueada: profissional {} tem alunos vinculados.", id);
        return Err(AppError::conflict(
            "Não é possível excluir: profissional possui alunos vinculados",
        ));
    }

    sqlx::query("DELETE FROM users WHERE id = ?1")
        .bind(id)
        .execute(db_pool)
        .await?;
    tracing::info!("🗑️ Profissional {} excluído.", id);
    Ok(())
}

/// Listagem para a tela de gestão, com total de alunos e ganhos.
pub async fn find_all_professionals(db_pool: &SqlitePool) -> AppResult<Vec<ProfessionalSummary>> {
    let professionals = sqlx::query_as::<_, ProfessionalSummary>(
        r#"
        SELECT
            u.id,
            u.nome,
            u.email,
            u.role,
            u.created_at,
            COUNT(p.id) AS total_alunos,
            CAST(COALESCE(SUM(p.ganho), 0) AS REAL) AS ganho_total
        FROM users u
        LEFT JOIN patients p ON p.profissional_id = u.id
        WHERE u.role = 'profissional'
        GROUP BY u.id
        ORDER BY u.nome ASC
        "#,
    )
    .fetch_all(db_pool)
    .await?;
    tracing::debug!("Encontrados {} profissionais.", professionals.len());
    Ok(professionals)
}

pub async fn list_professional_options(db_pool: &SqlitePool) -> AppResult<Vec<ProfessionalOption>> {
    let options = sqlx::query_as::<_, ProfessionalOption>(
        r#"
        SELECT u.id, u.nome, COUNT(p.id) AS total_alunos
        FROM users u
        LEFT JOIN patients p ON u.id = p.profissional_id
        WHERE u.role = 'profissional'
        GROUP BY u.id, u.nome
        ORDER BY u.nome ASC
        "#,
    )
    .fetch_all(db_pool)
    .await?;
    Ok(options)
}
