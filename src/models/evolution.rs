// src/models/evolution.rs
use crate::models::serde_ext;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Exercícios da sessão, agrupados por aparelho.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Exercises {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reformer: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cadillac: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chair: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub barrel: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub solo: Vec<String>,
}

// Representa uma evolução lida da tabela 'evolutions'
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Evolution {
    pub id: i64,
    pub patient_id: i64,
    pub date: NaiveDateTime,
    pub eva: Option<i64>, // escala de dor 0-10
    #[sqlx(json)]
    pub exercises: Exercises,
    pub notes: String,
    pub author: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Corpo de criação/atualização. Na criação a data é opcional (usa-se agora).
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EvolutionPayload {
    #[serde(default, deserialize_with = "serde_ext::optional_datetime")]
    pub date: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "serde_ext::optional_integer")]
    #[validate(range(min = 0, max = 10, message = "EVA deve estar entre 0 e 10"))]
    pub eva: Option<i64>,
    #[serde(default)]
    pub exercises: Exercises,
    #[validate(custom(function = "notas_preenchidas", message = "Notas são obrigatórias"))]
    pub notes: String,
}

fn notas_preenchidas(notes: &str) -> Result<(), validator::ValidationError> {
    if notes.trim().is_empty() {
        return Err(validator::ValidationError::new("blank"));
    }
    Ok(())
}

/// Média EVA de um aluno.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaAverage {
    #[serde(rename = "averageEVA")]
    pub average_eva: Option<f64>,
}
