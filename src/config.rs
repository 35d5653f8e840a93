// src/config.rs
use crate::error::{AppError, AppResult};
use std::env;

/// Tamanho mínimo aceite para o segredo JWT.
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Custo bcrypt dos testes (o mínimo que a biblioteca aceita).
pub const TEST_BCRYPT_COST: u32 = 4;

const DEV_JWT_SECRET: &str = "dev-secret-key-apenas-para-desenvolvimento!";

/// Ambiente em que o servidor corre. Em produção os detalhes de erros internos
/// não são devolvidos ao cliente.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub cors_origin: String,
    pub bcrypt_cost: u32,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Devolve ao cliente o detalhe dos erros 5xx.
    pub expose_error_details: bool,
}

// O segredo e a URL da base de dados nunca aparecem nos logs
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("environment", &self.environment)
            .field("cors_origin", &self.cors_origin)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("expose_error_details", &self.expose_error_details)
            .finish()
    }
}

impl Config {
    /// Lê a configuração das variáveis de ambiente (e do `.env`, se existir).
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let environment = match env::var("APP_ENV")
            .or_else(|_| env::var("NODE_ENV"))
            .unwrap_or_else(|_| "development".into())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        };

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) if environment == Environment::Development => {
                tracing::warn!("⚠️ JWT_SECRET não definida, a usar chave insegura de desenvolvimento");
                DEV_JWT_SECRET.to_string()
            }
            Err(_) => {
                return Err(AppError::Config(
                    "JWT_SECRET tem de estar definida em produção".into(),
                ))
            }
        };

        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(AppError::Config(format!(
                "JWT_SECRET deve ter pelo menos {} caracteres",
                MIN_JWT_SECRET_LENGTH
            )));
        }

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://studio.db".to_string()),
            jwt_secret,
            jwt_expiration_hours: parse_var("JWT_EXPIRATION_HOURS", 24)?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", 3000)?,
            environment,
            cors_origin: env::var("CORS_ORIGIN").unwrap_or_else(|_| "*".to_string()),
            bcrypt_cost: parse_var("BCRYPT_COST", 10)?,
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", 5)?,
            db_acquire_timeout_secs: parse_var("DB_ACQUIRE_TIMEOUT_SECS", 5)?,
            expose_error_details: environment == Environment::Development,
        })
    }

    /// Configuração usada nos testes: base em memória e bcrypt com custo mínimo.
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: "segredo-de-testes-com-pelo-menos-32-caracteres".to_string(),
            jwt_expiration_hours: 1,
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: Environment::Development,
            cors_origin: "*".to_string(),
            bcrypt_cost: TEST_BCRYPT_COST,
            db_max_connections: 1,
            db_acquire_timeout_secs: 5,
            expose_error_details: true,
        }
    }

    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> AppResult<T> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("Valor inválido para {}: '{}'", name, raw))),
        Err(_) => Ok(default),
    }
}
