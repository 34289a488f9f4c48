// Library interface for gitsync
// This exposes modules for integration testing

pub mod config;
pub mod error;
pub mod git;
pub mod llm;
pub mod logging;
pub mod render;

pub use error::ChangeSetError;
pub use git::{CanonicalChange, ChangeKind, ChangeRecord, ChangeSource};
pub use render::Console;
