// src/web/routes.rs
use crate::{
    error::AppError,
    state::AppState,
    web::{
        attendance_handlers, auth_handlers, evolution_handlers, mw_admin, mw_auth, mw_errors,
        patient_handlers, professional_handlers,
    },
};
use axum::{
    extract::State,
    http::Uri,
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};

pub fn create_router(app_state: AppState) -> Router {
    // --- Rotas Públicas ---
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(auth_handlers::handle_login));

    // --- Rotas de Gestor ---
    // Exigem login E role gestor
    let manager_routes = Router::new()
        .route("/auth/register", post(auth_handlers::handle_register))
        .route(
            "/professionals",
            get(professional_handlers::handle_list).post(professional_handlers::handle_create),
        )
        .route(
            "/professionals/{id}",
            get(professional_handlers::handle_get)
                .put(professional_handlers::handle_update)
                .delete(professional_handlers::handle_delete),
        )
        // Aplica APENAS mw_admin aqui (mw_auth é aplicado no router pai)
        .route_layer(middleware::from_fn(mw_admin::require_manager));

    let patient_routes = Router::new()
        .route(
            "/",
            get(patient_handlers::handle_list).post(patient_handlers::handle_create),
        )
        .route("/stats", get(patient_handlers::handle_stats))
        .route(
            "/{id}",
            get(patient_handlers::handle_get)
                .put(patient_handlers::handle_update)
                .delete(patient_handlers::handle_delete),
        )
        .route(
            "/{id}/attendance",
            get(attendance_handlers::handle_list).post(attendance_handlers::handle_create),
        )
        .route("/{id}/attendance/stats", get(attendance_handlers::handle_stats))
        .route(
            "/{id}/attendance/{att_id}",
            put(attendance_handlers::handle_update).delete(attendance_handlers::handle_delete),
        )
        .route(
            "/{id}/evolutions",
            get(evolution_handlers::handle_list).post(evolution_handlers::handle_create),
        )
        .route("/{id}/evolutions/latest", get(evolution_handlers::handle_latest))
        .route(
            "/{id}/evolutions/eva-average",
            get(evolution_handlers::handle_eva_average),
        )
        .route(
            "/{id}/evolutions/{evo_id}",
            put(evolution_handlers::handle_update).delete(evolution_handlers::handle_delete),
        );

    // --- Rotas Autenticadas ---
    // Exigem *pelo menos* um token válido
    let authenticated_routes = Router::new()
        .route("/auth/me", get(auth_handlers::handle_me))
        .route("/auth/password", put(auth_handlers::handle_change_password))
        .route(
            "/auth/professionals",
            get(auth_handlers::handle_list_professional_options),
        )
        .nest("/patients", patient_routes)
        .merge(manager_routes)
        // require_auth vale para TODAS as rotas acima, incluindo as de gestor
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            mw_auth::require_auth,
        ));

    // --- Router Final ---
    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .fallback(not_found)
        // Fica por fora para apanhar também os erros dos outros middlewares
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            mw_errors::expose_error_details,
        ))
        .with_state(app_state)
}

// GET /health
async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": Utc::now().to_rfc3339(),
            "environment": state.config.environment.as_str(),
        }
    }))
}

async fn not_found(uri: Uri) -> AppError {
    AppError::not_found(format!("Rota não encontrada: {}", uri.path()))
}
