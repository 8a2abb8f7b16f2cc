//! Defines data structures for the application.
//!
//! Includes structs for:
//! - The inbound webhook request and the service's own JSON responses (`request`).
//! - Serializing/deserializing Gemini `generateContent` calls (`gemini`).
//! - Serializing/deserializing GitHub REST API calls (`github`).

mod gemini;
mod github;
mod request;

pub use gemini::*;
pub use github::*;
pub use request::*;
