//! Presentation layer of the obesity level predictor: HTML form rendering
//! and the axum routes serving it.

pub mod render;
pub mod server;

pub use server::{build_telemetry, router, serve, AppState};
