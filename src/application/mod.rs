//! Application services layer scaffolding.

pub mod auth;
pub mod cache;
pub mod catalog;
pub mod error;
pub mod filter;
pub mod pagination;
pub mod repos;
