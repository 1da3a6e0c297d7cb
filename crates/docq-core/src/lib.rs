//! Core types and trait definitions for the docq document repository.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it.

pub mod account;
pub mod document;
pub mod history;
pub mod search;
pub mod store;
