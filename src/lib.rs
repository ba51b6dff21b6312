//! Gatepass Visitor Management System
//!
//! A Rust implementation of the Gatepass visitor management server,
//! providing a REST JSON API for front-desk registration, host approval,
//! pre-approved scheduled visits, and check-in/check-out.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
