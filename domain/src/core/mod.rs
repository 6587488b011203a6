//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`] - language models the agent can be driven by
//! - [`error::DomainError`] - domain-level errors

pub mod error;
pub mod model;
