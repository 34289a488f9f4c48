pub mod backend;
pub mod classify;
pub mod cli;
pub mod operations;
pub mod reader;
pub mod reconcile;
pub mod transcript;
pub mod types;

pub use backend::{BackendKind, VcsBackend, open_backend};
pub use classify::classify;
pub use reader::list_working_tree_changes;
pub use reconcile::reconcile;
pub use transcript::{DEFAULT_MAX_TRANSCRIPT_CHARS, TranscriptSections, assemble_transcript};
pub use types::*;
