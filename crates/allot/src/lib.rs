//! Core library for the allocation platform: domain model, scoring and
//! allocation engines, and the HTTP surface that exposes them.

pub mod allocation;
pub mod config;
pub mod error;
pub mod telemetry;
