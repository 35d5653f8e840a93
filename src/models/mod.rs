// src/models/mod.rs
pub mod attendance;
pub mod evolution;
pub mod patient;
pub mod serde_ext;
pub mod stats;
pub mod user;
