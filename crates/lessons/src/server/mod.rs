//! REST API module for the lessons service
//!
//! Uses axum for routing and schemars for request/response schema
//! generation. Shared services are injected through [`state::AppState`].

pub mod handlers;
pub mod middleware;
pub mod routing;
pub mod services;
pub mod startup;
pub mod state;
pub mod types;
