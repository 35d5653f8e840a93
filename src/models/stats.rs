// src/models/stats.rs
use serde::Serialize;

/// Arredonda a duas casas decimais.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `parte / total * 100` com duas casas; 0 quando não há registos.
pub fn taxa_percentual(parte: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    round2(parte as f64 / total as f64 * 100.0)
}

/// Contagens de frequência de um aluno.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttendanceStats {
    pub present: i64,
    pub absent: i64,
    pub makeup: i64,
    pub total: i64,
    #[serde(rename = "attendanceRate")]
    pub attendance_rate: f64,
}

impl AttendanceStats {
    pub fn from_counts(present: i64, absent: i64, makeup: i64) -> Self {
        let total = present + absent + makeup;
        Self {
            present,
            absent,
            makeup,
            total,
            attendance_rate: taxa_percentual(present, total),
        }
    }
}

/// Resumo do estúdio (ou de um profissional).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientStats {
    pub total_alunos: i64,
    pub ganho_total: f64,
    pub presencas: i64,
    pub faltas: i64,
    pub taxa_presenca: f64,
}

impl PatientStats {
    // Reposições não entram na taxa
    pub fn from_counts(total_alunos: i64, ganho_total: f64, presencas: i64, faltas: i64) -> Self {
        Self {
            total_alunos,
            ganho_total: round2(ganho_total),
            presencas,
            faltas,
            taxa_presenca: taxa_percentual(presencas, presencas + faltas),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxa_com_duas_presencas_e_uma_falta() {
        let stats = AttendanceStats::from_counts(2, 1, 0);
        assert_eq!(
            stats,
            AttendanceStats {
                present: 2,
                absent: 1,
                makeup: 0,
                total: 3,
                attendance_rate: 66.67,
            }
        );
    }

    #[test]
    fn taxa_zero_sem_registos() {
        assert_eq!(AttendanceStats::from_counts(0, 0, 0).attendance_rate, 0.0);
        assert_eq!(taxa_percentual(0, 0), 0.0);
    }

    #[test]
    fn reposicao_conta_no_total_do_aluno() {
        let stats = AttendanceStats::from_counts(1, 0, 1);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.attendance_rate, 50.0);
    }

    #[test]
    fn resumo_ignora_reposicoes_na_taxa() {
        let stats = PatientStats::from_counts(2, 204.0, 3, 1);
        assert_eq!(stats.taxa_presenca, 75.0);
        assert_eq!(stats.ganho_total, 204.0);
    }

    #[test]
    fn resumo_serializa_em_camel_case() {
        let json = serde_json::to_value(PatientStats::from_counts(1, 10.0, 1, 0)).unwrap();
        assert_eq!(json["totalAlunos"], 1);
        assert_eq!(json["taxaPresenca"], 100.0);
    }
}
