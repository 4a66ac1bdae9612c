//! Listino: a small self-hosted item catalog service.
//!
//! Library target so integration tests and embedding binaries can reach the
//! application and infrastructure layers directly.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
