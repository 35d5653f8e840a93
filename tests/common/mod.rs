#![allow(dead_code)]

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use studio_pilates::{
    build_app, config::Config, db, models::user::Role, services::user_service, state::AppState,
};
use tower::ServiceExt;

pub const GESTOR: (&str, &str) = ("gestor@studio.com", "gestor123");
pub const PROF1: (&str, &str) = ("prof1@studio.com", "prof123");
pub const PROF2: (&str, &str) = ("prof2@studio.com", "prof123");

/// App completa sobre uma base em memória, com um gestor e dois profissionais.
pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    pub gestor_id: i64,
    pub prof1_id: i64,
    pub prof2_id: i64,
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(Config::for_tests()).await
    }

    pub async fn spawn_with(config: Config) -> Result<Self> {
        let pool = db::create_in_memory_pool().await?;

        let cost = config.bcrypt_cost;
        let gestor =
            user_service::create_user(&pool, "Gestor Master", GESTOR.0, GESTOR.1, Role::Manager, cost)
                .await?;
        let prof1 = user_service::create_user(
            &pool,
            "Profissional Silva",
            PROF1.0,
            PROF1.1,
            Role::Practitioner,
            cost,
        )
        .await?;
        let prof2 = user_service::create_user(
            &pool,
            "Profissional Clara",
            PROF2.0,
            PROF2.1,
            Role::Practitioner,
            cost,
        )
        .await?;

        let router = build_app(AppState::new(pool.clone(), config));
        Ok(Self {
            router,
            pool,
            gestor_id: gestor.id,
            prof1_id: prof1.id,
            prof2_id: prof2.id,
        })
    }

    /// Envia um pedido e devolve o estado e o corpo JSON (Null se vazio).
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).context("resposta não é JSON")?
        };
        Ok((status, json))
    }

    pub async fn get(&self, uri: &str, token: &str) -> Result<(StatusCode, Value)> {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> Result<(StatusCode, Value)> {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    pub async fn login(&self, (email, senha): (&str, &str)) -> Result<String> {
        let (status, body) = self
            .request(
                Method::POST,
                "/auth/login",
                None,
                Some(json!({ "email": email, "senha": senha })),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "login falhou: {} {}", status, body);
        body["data"]["token"]
            .as_str()
            .map(str::to_string)
            .context("token ausente")
    }

    /// Cria um aluno fixo e devolve o ID.
    pub async fn create_patient(&self, token: &str, nome: &str, profissional_id: i64) -> Result<i64> {
        let (status, body) = self
            .post("/patients", token, patient_body(nome, profissional_id))
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "criação falhou: {} {}", status, body);
        body["data"]["id"].as_i64().context("id ausente")
    }
}

pub fn patient_body(nome: &str, profissional_id: i64) -> Value {
    json!({
        "nome": nome,
        "profissional_id": profissional_id,
        "dias": ["seg", "qua"],
        "horarios": { "seg": "08:00", "qua": "08:00" },
        "tipo": "fixo",
        "valor": 400,
        "porcentagem": 30,
        "data_inicio": "2025-01-01"
    })
}

pub fn assert_close(actual: &Value, expected: f64) {
    let actual = actual.as_f64().unwrap_or(f64::NAN);
    assert!(
        (actual - expected).abs() < 1e-9,
        "esperado {}, obtido {}",
        expected,
        actual
    );
}
