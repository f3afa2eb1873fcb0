//! Auth types shared across Relay services.
//!
//! Authentication happens at the gateway; services only consume the identity
//! it injects through the `IdentityHeaders` extractor.

pub mod identity;
