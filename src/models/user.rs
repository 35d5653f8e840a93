// src/models/user.rs
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Papel do utilizador no estúdio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
pub enum Role {
    #[serde(rename = "gestor")]
    #[sqlx(rename = "gestor")]
    Manager,
    #[serde(rename = "profissional")]
    #[sqlx(rename = "profissional")]
    Practitioner,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Manager => "gestor",
            Role::Practitioner => "profissional",
        }
    }
}

// Representa um utilizador lido da tabela 'users'
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub nome: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub senha: String, // hash bcrypt, nunca sai na resposta
    pub role: Role,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Utilizador autenticado, extraído do token e posto nas extensões do pedido.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
    pub email: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn is_manager(&self) -> bool {
        self.role == Role::Manager
    }
}

/// Linha da listagem de gestão de profissionais.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProfessionalSummary {
    pub id: i64,
    pub nome: String,
    pub email: String,
    pub role: Role,
    pub created_at: NaiveDateTime,
    pub total_alunos: i64,
    pub ganho_total: f64,
}

/// Versão curta usada nos selects do frontend.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProfessionalOption {
    pub id: i64,
    pub nome: String,
    pub total_alunos: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Email inválido"))]
    pub email: String,
    #[validate(length(min = 6, message = "Senha deve ter no mínimo 6 caracteres"))]
    pub senha: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 255, message = "Nome deve ter entre 3 e 255 caracteres"))]
    pub nome: String,
    #[validate(email(message = "Email inválido"))]
    pub email: String,
    #[validate(length(min = 6, message = "Senha deve ter no mínimo 6 caracteres"))]
    pub senha: String,
    pub role: Role,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    #[validate(length(min = 1, message = "Senha atual é obrigatória"))]
    pub senha_atual: String,
    #[validate(length(min = 6, message = "Nova senha deve ter no mínimo 6 caracteres"))]
    pub nova_senha: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProfessionalRequest {
    #[validate(custom(function = "not_blank", message = "Nome é obrigatório"))]
    pub nome: String,
    #[validate(email(message = "Email inválido"))]
    pub email: String,
    #[validate(length(min = 6, message = "Senha deve ter no mínimo 6 caracteres"))]
    pub senha: String,
}

/// Atualização de um profissional. Senha vazia ou ausente mantém a atual.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfessionalRequest {
    #[validate(custom(function = "not_blank", message = "Nome é obrigatório"))]
    pub nome: String,
    #[validate(email(message = "Email inválido"))]
    pub email: String,
    #[serde(default)]
    pub senha: Option<String>,
}

impl UpdateProfessionalRequest {
    pub fn nova_senha(&self) -> Option<&str> {
        self.senha.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_usa_nomes_em_portugues() {
        assert_eq!(serde_json::to_value(Role::Manager).unwrap(), "gestor");
        let role: Role = serde_json::from_str("\"profissional\"").unwrap();
        assert_eq!(role, Role::Practitioner);
        assert!(serde_json::from_str::<Role>("\"admin\"").is_err());
    }

    #[test]
    fn senha_nao_e_serializada() {
        let user = User {
            id: 1,
            nome: "Gestor".into(),
            email: "gestor@studio.com".into(),
            senha: "$2b$hash".into(),
            role: Role::Manager,
            created_at: NaiveDateTime::default(),
            updated_at: NaiveDateTime::default(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("senha").is_none());
        assert_eq!(json["role"], "gestor");
    }

    #[test]
    fn login_valida_email_e_tamanho_da_senha() {
        let req = LoginRequest {
            email: "nao-e-email".into(),
            senha: "123".into(),
        };
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("senha"));
    }

    #[test]
    fn senha_em_branco_na_atualizacao_e_ignorada() {
        let req: UpdateProfessionalRequest = serde_json::from_str(
            r#"{"nome": "Clara", "email": "clara@studio.com", "senha": "  "}"#,
        )
        .unwrap();
        assert_eq!(req.nova_senha(), None);
    }
}
