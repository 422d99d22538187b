pub mod auth_steps;
pub mod common;
pub mod crud_steps;
