//! fabtrack: client for the fabrication job tracker.
//!
//! The REST backend is reached through [`services::api_client::ApiClient`];
//! file content shown in previews is served back to the user's viewer by a
//! small local axum server (see [`routes::routes`]).

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod shell;
pub mod view;

#[cfg(test)]
mod test_support;
