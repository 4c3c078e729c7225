//! Axum web adapter for facelift.
//!
//! Exposes the model lifecycle (status, downloads with SSE progress,
//! loading) and the enhancement endpoint over HTTP. The composition root
//! in [`bootstrap`] is the only place concrete adapters are wired to the
//! core ports.

pub mod bootstrap;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod sse;
pub mod state;

pub use bootstrap::{AppContext, CorsConfig, ServerConfig, start_server};
pub use routes::{create_router, create_spa_router};
pub use state::AppState;
