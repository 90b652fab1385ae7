pub mod configuration;
pub mod container_management;
pub mod engine_client;
pub mod error_handling;
pub mod health_metrics;
pub mod resource_translation;
