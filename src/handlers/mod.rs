//! HTTP handlers

pub mod health;
pub mod rules;
pub mod analyze;
