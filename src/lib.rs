// Infrastructure layer (shared components)
pub mod config;
pub mod error;
pub mod store;

// Domain layer (business logic)
pub mod domain;
pub mod service;
pub mod template;

// Application layer
pub mod api;
pub mod server;
