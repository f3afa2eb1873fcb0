//! Domain types shared across all Relay services.
//!
//! This crate contains only pure types with no framework dependencies.
//! Import in `usecase/` and `domain/` layers; never in `infra/` or `handlers/`.

pub mod event;
pub mod id;
pub mod pagination;
pub mod role;
