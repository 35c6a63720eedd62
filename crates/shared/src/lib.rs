//! Shared utilities and common types for the Farm Manager client.
//!
//! This crate provides common functionality used across all other crates:
//! - ISO calendar date parsing and formatting
//! - Common validation logic

pub mod dates;
pub mod validation;
