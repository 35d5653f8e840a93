// src/services/mod.rs
pub mod access_service;
pub mod attendance_service;
pub mod auth_service;
pub mod evolution_service;
pub mod patient_service;
pub mod user_service;
