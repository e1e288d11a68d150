// Core registry module - content moderation business logic.
// Same split as the other core features: models, service, storage port.

pub mod registry_models;
pub mod registry_service;
pub mod registry_store;

pub use registry_models::*;
pub use registry_service::*;
pub use registry_store::*;
