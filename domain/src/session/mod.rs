//! Session domain.
//!
//! A session owns one conversation context and one wallet context; the
//! identifier is the only part the domain layer needs.

pub mod id;

pub use id::SessionId;
