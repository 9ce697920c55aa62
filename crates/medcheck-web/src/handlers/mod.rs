//! HTTP handlers, one module per resource.

pub mod auth;
pub mod check;
pub mod health;
pub mod medications;
pub mod profile;
