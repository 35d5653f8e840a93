// src/web/mod.rs
pub mod attendance_handlers;
pub mod auth_handlers;
pub mod evolution_handlers;
pub mod extract;
pub mod mw_admin;
pub mod mw_auth;
pub mod mw_errors;
pub mod patient_handlers;
pub mod professional_handlers;
pub mod response;
pub mod routes;
