//! HTTP handlers

pub mod health;
pub mod history;
pub mod predict;
pub mod status;
