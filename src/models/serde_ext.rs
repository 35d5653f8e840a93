// src/models/serde_ext.rs
//! Desserialização tolerante para os formatos que o frontend envia.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{de, Deserialize, Deserializer};
use serde_json::Value;

/// Aceita `YYYY-MM-DD` ou um timestamp ISO 8601 (fica só a parte da data).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_datetime(raw).map(|dt| dt.date()))
}

/// Aceita RFC 3339, `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD HH:MM:SS` ou só a data.
/// Timestamps com fuso são convertidos para UTC.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

pub fn date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).ok_or_else(|| de::Error::custom(format!("data inválida: '{}'", raw)))
}

pub fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_date(&raw)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("data inválida: '{}'", raw))),
    }
}

pub fn optional_datetime<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_datetime(&raw)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("data inválida: '{}'", raw))),
    }
}

// Número JSON ou texto numérico. `None` para null e texto vazio.
// Infinito e NaN nunca passam.
fn number_from_value(value: Value) -> Result<Option<f64>, String> {
    let n = match value {
        Value::Null => return Ok(None),
        Value::Number(n) => n.as_f64().ok_or_else(|| "número inválido".to_string())?,
        Value::String(s) if s.trim().is_empty() => return Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("número inválido: '{}'", s))?,
        other => return Err(format!("número inválido: {}", other)),
    };
    if n.is_finite() {
        Ok(Some(n))
    } else {
        Err("número fora do intervalo".to_string())
    }
}

/// Número obrigatório; aceita também texto numérico (`"400"`).
pub fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    number_from_value(Value::deserialize(deserializer)?)
        .map_err(de::Error::custom)?
        .ok_or_else(|| de::Error::custom("número obrigatório"))
}

/// Número opcional: `null`, ausente ou `""` dão `None`; aceita também texto numérico.
pub fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None => Ok(None),
        Some(value) => number_from_value(value).map_err(de::Error::custom),
    }
}

/// Inteiro opcional, com as mesmas regras de `optional_number`. Frações são rejeitadas.
pub fn optional_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("esperado número inteiro: {}", n))),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("esperado número inteiro: '{}'", s))),
        Some(other) => Err(de::Error::custom(format!(
            "esperado número inteiro: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datas_em_varios_formatos() {
        let esperado = NaiveDate::from_ymd_opt(2025, 2, 10).unwrap();
        assert_eq!(parse_date("2025-02-10"), Some(esperado));
        assert_eq!(parse_date("2025-02-10T00:00:00.000Z"), Some(esperado));
        assert_eq!(parse_date("10/02/2025"), None);
    }

    #[test]
    fn timestamp_com_fuso_vai_para_utc() {
        let dt = parse_datetime("2025-02-10T10:30:00-03:00").unwrap();
        assert_eq!(dt.to_string(), "2025-02-10 13:30:00");
    }

    #[test]
    fn numero_opcional_tolera_texto_vazio() {
        #[derive(Deserialize)]
        struct Wrapper {
            #[serde(default, deserialize_with = "optional_number")]
            valor: Option<f64>,
        }

        let vazio: Wrapper = serde_json::from_str(r#"{"valor": ""}"#).unwrap();
        assert_eq!(vazio.valor, None);
        let ausente: Wrapper = serde_json::from_str("{}").unwrap();
        assert_eq!(ausente.valor, None);
        let texto: Wrapper = serde_json::from_str(r#"{"valor": "150.5"}"#).unwrap();
        assert_eq!(texto.valor, Some(150.5));
        let numero: Wrapper = serde_json::from_str(r#"{"valor": 90}"#).unwrap();
        assert_eq!(numero.valor, Some(90.0));
    }

    #[test]
    fn numero_obrigatorio_aceita_texto_e_rejeita_vazio() {
        #[derive(Debug, Deserialize)]
        struct Wrapper {
            #[serde(deserialize_with = "number")]
            valor: f64,
        }

        let texto: Wrapper = serde_json::from_str(r#"{"valor": " 400 "}"#).unwrap();
        assert_eq!(texto.valor, 400.0);
        assert!(serde_json::from_str::<Wrapper>(r#"{"valor": ""}"#).is_err());
        assert!(serde_json::from_str::<Wrapper>(r#"{"valor": null}"#).is_err());
        assert!(serde_json::from_str::<Wrapper>(r#"{"valor": "abc"}"#).is_err());
        assert!(serde_json::from_str::<Wrapper>("{}").is_err());
    }

    #[test]
    fn infinito_e_nan_em_texto_sao_rejeitados() {
        #[derive(Debug, Deserialize)]
        struct Wrapper {
            #[serde(deserialize_with = "number")]
            valor: f64,
        }

        for raw in ["inf", "-infinity", "NaN", "1e999"] {
            let json = format!(r#"{{"valor": "{}"}}"#, raw);
            assert!(serde_json::from_str::<Wrapper>(&json).is_err(), "{}", raw);
        }
    }

    #[test]
    fn inteiro_opcional_aceita_texto_e_rejeita_fracao() {
        #[derive(Debug, Deserialize)]
        struct Wrapper {
            #[serde(default, deserialize_with = "optional_integer")]
            eva: Option<i64>,
        }

        let texto: Wrapper = serde_json::from_str(r#"{"eva": "7"}"#).unwrap();
        assert_eq!(texto.eva, Some(7));
        let numero: Wrapper = serde_json::from_str(r#"{"eva": 3}"#).unwrap();
        assert_eq!(numero.eva, Some(3));
        let vazio: Wrapper = serde_json::from_str(r#"{"eva": ""}"#).unwrap();
        assert_eq!(vazio.eva, None);
        let ausente: Wrapper = serde_json::from_str("{}").unwrap();
        assert_eq!(ausente.eva, None);
        assert!(serde_json::from_str::<Wrapper>(r#"{"eva": 3.5}"#).is_err());
        assert!(serde_json::from_str::<Wrapper>(r#"{"eva": "3.5"}"#).is_err());
    }
}
