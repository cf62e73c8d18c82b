//! Shared helpers for the database-backed tests.

pub mod postgres;
pub mod runtime;
