//! # Admin Handlers

pub mod actions;
pub mod health;
