//! Core types and progression rules for the CryptoLingo learning service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod achievement;
pub mod engine;
pub mod error;
pub mod lesson;
pub mod path;
pub mod progress;
pub mod progression;
pub mod store;
pub mod user;
pub mod view;

pub use error::{Error, Result};
