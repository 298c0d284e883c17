//! Normalized chat messages
//!
//! Backend-agnostic message types produced by the compiler and consumed by
//! every provider adapter.

mod types;

pub use types::{Message, Role};
