// src/models/patient.rs
use crate::models::{attendance::Attendance, evolution::Evolution, serde_ext};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;
use std::str::FromStr;
use validator::{Validate, ValidationError};

/// Parte da base que fica para o profissional quando não há ganho fixo (15% de desconto).
pub const FATOR_GANHO: f64 = 0.85;

/// Dias em que o estúdio funciona.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiaSemana {
    Seg,
    Ter,
    Qua,
    Qui,
    Sex,
    Sab,
}

impl FromStr for DiaSemana {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "seg" => Ok(DiaSemana::Seg),
            "ter" => Ok(DiaSemana::Ter),
            "qua" => Ok(DiaSemana::Qua),
            "qui" => Ok(DiaSemana::Qui),
            "sex" => Ok(DiaSemana::Sex),
            "sab" => Ok(DiaSemana::Sab),
            _ => Err(()),
        }
    }
}

/// Tipo de contrato do aluno.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum PatientKind {
    #[serde(rename = "fixo")]
    #[sqlx(rename = "fixo")]
    Fixed,
    #[serde(rename = "experimental")]
    #[sqlx(rename = "experimental")]
    Trial,
    #[serde(rename = "convenio")]
    #[sqlx(rename = "convenio")]
    Insurance,
}

/// Resultado do cálculo de ganhos.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Earnings {
    pub base: f64,
    pub ganho: f64,
}

/// Calcula `base` e `ganho` de um aluno.
///
/// - experimental: tudo a zero;
/// - com ganho fixo: a base continua a ser `valor * porcentagem / 100`, o ganho é o fixo;
/// - caso contrário: ganho = base menos 15%.
pub fn calcular_ganho(
    tipo: PatientKind,
    valor: f64,
    porcentagem: f64,
    ganho_fixo: Option<f64>,
) -> Earnings {
    match tipo {
        PatientKind::Trial => Earnings { base: 0.0, ganho: 0.0 },
        PatientKind::Fixed | PatientKind::Insurance => {
            let base = valor * porcentagem / 100.0;
            let ganho = match ganho_fixo {
                Some(fixo) => fixo,
                None => base * FATOR_GANHO,
            };
            Earnings { base, ganho }
        }
    }
}

// Representa um aluno lido da tabela 'patients' (com o nome do profissional)
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Patient {
    pub id: i64,
    pub nome: String,
    pub profissional_id: Option<i64>,
    pub profissional_nome: Option<String>,
    #[sqlx(json)]
    pub dias: Vec<DiaSemana>,
    #[sqlx(json)]
    pub horarios: BTreeMap<String, String>,
    pub valor: f64,
    pub porcentagem: f64,
    pub base: f64,
    pub ganho: f64,
    pub ganho_fixo: Option<f64>,
    pub tipo: PatientKind,
    pub data_inicio: NaiveDate,
    pub data_fim: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Linha da listagem, com contadores.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PatientSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub patient: Patient,
    pub total_attendance: i64,
    pub total_evolutions: i64,
}

/// Aluno com frequências e evoluções (mais recentes primeiro).
#[derive(Debug, Clone, Serialize)]
pub struct PatientDetails {
    #[serde(flatten)]
    pub patient: Patient,
    pub attendance: Vec<Attendance>,
    pub evolutions: Vec<Evolution>,
}

/// Corpo de criação/atualização de um aluno. `base` e `ganho` nunca vêm do cliente.
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validar_periodo", skip_on_field_errors = false))]
pub struct PatientPayload {
    #[validate(length(min = 3, max = 255, message = "Nome deve ter entre 3 e 255 caracteres"))]
    pub nome: String,
    #[serde(alias = "profissional")]
    #[validate(range(min = 1, message = "Profissional inválido"))]
    pub profissional_id: i64,
    #[validate(length(min = 1, message = "Selecione pelo menos um dia"))]
    pub dias: Vec<DiaSemana>,
    #[serde(default)]
    #[validate(custom(function = "validar_horarios"))]
    pub horarios: BTreeMap<String, String>,
    pub tipo: PatientKind,
    #[serde(deserialize_with = "serde_ext::number")]
    #[validate(range(
        min = 0.0,
        max = 1_000_000.0,
        message = "Valor deve estar entre 0 e 1.000.000"
    ))]
    pub valor: f64,
    #[serde(deserialize_with = "serde_ext::number")]
    #[validate(range(min = 0.0, max = 100.0, message = "Porcentagem deve estar entre 0 e 100"))]
    pub porcentagem: f64,
    #[serde(default, deserialize_with = "serde_ext::optional_number")]
    #[validate(range(
        min = 0.0,
        max = 1_000_000.0,
        message = "Ganho fixo deve estar entre 0 e 1.000.000"
    ))]
    pub ganho_fixo: Option<f64>,
    #[serde(deserialize_with = "serde_ext::date")]
    pub data_inicio: NaiveDate,
    #[serde(default, deserialize_with = "serde_ext::optional_date")]
    pub data_fim: Option<NaiveDate>,
}

/// Valores prontos a gravar, já com os ganhos recalculados.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientRecord {
    pub nome: String,
    pub profissional_id: i64,
    pub dias: Vec<DiaSemana>,
    pub horarios: BTreeMap<String, String>,
    pub valor: f64,
    pub porcentagem: f64,
    pub base: f64,
    pub ganho: f64,
    pub ganho_fixo: Option<f64>,
    pub tipo: PatientKind,
    pub data_inicio: NaiveDate,
    pub data_fim: Option<NaiveDate>,
}

impl PatientPayload {
    /// Normaliza o pedido: aulas experimentais não têm valor nem ganho.
    pub fn into_record(self) -> PatientRecord {
        let (valor, porcentagem, ganho_fixo) = match self.tipo {
            PatientKind::Trial => (0.0, 0.0, None),
            _ => (self.valor, self.porcentagem, self.ganho_fixo),
        };
        let Earnings { base, ganho } = calcular_ganho(self.tipo, valor, porcentagem, ganho_fixo);

        let mut dias = self.dias;
        dias.sort();
        dias.dedup();

        PatientRecord {
            nome: self.nome.trim().to_string(),
            profissional_id: self.profissional_id,
            dias,
            horarios: self.horarios,
            valor,
            porcentagem,
            base,
            ganho,
            ganho_fixo,
            tipo: self.tipo,
            data_inicio: self.data_inicio,
            data_fim: self.data_fim,
        }
    }
}

fn validar_horarios(horarios: &BTreeMap<String, String>) -> Result<(), ValidationError> {
    for (dia, hora) in horarios {
        if DiaSemana::from_str(dia).is_err() {
            let mut err = ValidationError::new("dia_invalido");
            err.message = Some(format!("Dia inválido em horarios: '{}'", dia).into());
            return Err(err);
        }
        if !hora_valida(hora) {
            let mut err = ValidationError::new("hora_invalida");
            err.message = Some(format!("Horário inválido para '{}': use HH:MM", dia).into());
            return Err(err);
        }
    }
    Ok(())
}

// HH:MM com dois dígitos, 00:00 a 23:59
fn hora_valida(hora: &str) -> bool {
    hora.len() == 5 && NaiveTime::parse_from_str(hora, "%H:%M").is_ok()
}

fn validar_periodo(payload: &PatientPayload) -> Result<(), ValidationError> {
    match payload.data_fim {
        Some(fim) if fim < payload.data_inicio => {
            let mut err = ValidationError::new("periodo_invalido");
            err.message = Some("Data de fim não pode ser anterior à data de início".into());
            Err(err)
        }
        _ => Ok(()),
    }
}
