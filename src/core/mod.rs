//! Core types, errors, events, and configuration

pub mod config;
pub mod error;
pub mod events;
pub mod types;
