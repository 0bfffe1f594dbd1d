//! Types shared across the assembly-line workspace

pub mod answers;
pub mod types;

pub use answers::{AnswerStore, Answers};
pub use types::{with_extension, Artifact, FileKind};
