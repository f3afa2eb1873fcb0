//! Test utilities for Relay services.
//!
//! Provides `MockAuth` identity headers and the JSON fixture loader.
//! Only for `[dev-dependencies]`.

pub mod auth;
pub mod fixture;
