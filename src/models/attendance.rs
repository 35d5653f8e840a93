// src/models/attendance.rs
use crate::models::serde_ext;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Makeup, // reposição
}

/// Registo de frequência (um por aluno por dia).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Attendance {
    pub id: i64,
    pub patient_id: i64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub notes: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AttendancePayload {
    #[serde(deserialize_with = "serde_ext::date")]
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[serde(default)]
    #[validate(length(max = 2000, message = "Observações muito longas"))]
    pub notes: Option<String>,
}

impl AttendancePayload {
    pub fn notes(&self) -> &str {
        self.notes.as_deref().unwrap_or("")
    }
}
