pub mod api_client;
pub mod file_backend;
pub mod object_urls;
pub mod preview_registry;
