//! The background deployment job and its stages.
//!
//! - `codegen`: brief + attachments -> site files via the LLM.
//! - `publish`: files -> GitHub repository, Pages enabled.
//! - `deploy`: the end-to-end job run for every accepted request.

mod codegen;
mod deploy;
mod publish;

pub use codegen::*;
pub use deploy::*;
pub use publish::*;
