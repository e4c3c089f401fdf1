pub mod health_handlers;
pub mod preview_handlers;
