//! Clients for external collaborator services

pub mod auth;

pub use auth::AuthServiceClient;
