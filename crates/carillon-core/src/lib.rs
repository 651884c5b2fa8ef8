//! Carillon scheduler - configuration and shared error types.

pub mod config;
pub mod error;
