//! Builds the bounded diff transcript handed to the message generator.

use log::debug;

use super::backend::VcsBackend;

pub const DEFAULT_MAX_TRANSCRIPT_CHARS: usize = 8000;

/// Raw inputs for the transcript, in the order they are emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptSections {
    pub staged_diff: String,
    pub unstaged_diff: String,
    pub untracked: Vec<String>,
}

impl TranscriptSections {
    /// Query the backend for all three sections. Failed queries leave their
    /// section empty.
    pub fn collect(backend: &dyn VcsBackend) -> Self {
        let staged_diff = backend.staged_diff().unwrap_or_else(|e| {
            debug!("staged diff query failed: {e}");
            String::new()
        });
        let unstaged_diff = backend.unstaged_diff().unwrap_or_else(|e| {
            debug!("unstaged diff query failed: {e}");
            String::new()
        });
        let untracked = backend.untracked_paths().unwrap_or_else(|e| {
            debug!("untracked query failed: {e}");
            Vec::new()
        });

        Self {
            staged_diff,
            unstaged_diff,
            untracked,
        }
    }

    /// Concatenate the non-empty sections, then cut to `max_chars` characters.
    pub fn render(&self, max_chars: usize) -> String {
        let mut transcript = String::new();

        if !self.staged_diff.is_empty() {
            transcript.push_str(&format!("Staged changes:\n{}\n", self.staged_diff));
        }
        if !self.unstaged_diff.is_empty() {
            transcript.push_str(&format!("Unstaged changes:\n{}\n", self.unstaged_diff));
        }
        if !self.untracked.is_empty() {
            transcript.push_str(&format!(
                "New untracked files:\n{}\n",
                self.untracked.join("\n")
            ));
        }

        truncate_chars(&mut transcript, max_chars);
        transcript
    }
}

pub fn assemble_transcript(backend: &dyn VcsBackend, max_chars: usize) -> String {
    let transcript = TranscriptSections::collect(backend).render(max_chars);
    debug!("Assembled transcript of {} chars", transcript.chars().count());
    transcript
}

/// Hard cut after `max_chars` characters; may land mid-line or mid-section.
fn truncate_chars(text: &mut String, max_chars: usize) {
    if let Some((byte_index, _)) = text.char_indices().nth(max_chars) {
        text.truncate(byte_index);
    }
}
