//! Infrastructure layer: storage, application services, config.

pub mod config;
pub mod services;
pub mod store;
