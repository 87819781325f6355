// ABOUTME: Mentor persona directive builder — compiled-in default with a file override.
// ABOUTME: Appends a one-line mood context suffix when a mood is active.

use std::fs;
use std::path::PathBuf;

use crate::types::Mood;

/// Compiled-in default mentor directive.
const DEFAULT_MENTOR: &str = include_str!("prompts/mentor.md");

/// Reads a file if it exists, returning None otherwise.
fn read_if_exists(path: PathBuf) -> Option<String> {
    if path.exists() {
        fs::read_to_string(&path).ok()
    } else {
        None
    }
}

/// Assembles the persona directive sent ahead of every text conversation.
/// The directive itself can be replaced by `~/.adib/mentor.md`; the mood
/// suffix is always appended last.
#[derive(Debug, Clone)]
pub struct PersonaBuilder {
    pub directive: String,
}

impl PersonaBuilder {
    /// Creates a builder loaded with the compiled-in directive.
    pub fn new() -> Self {
        Self {
            directive: DEFAULT_MENTOR.to_string(),
        }
    }

    /// Checks `~/.adib/mentor.md` and replaces the directive if found.
    pub fn load_override(&mut self) -> &mut Self {
        let path = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".adib")
            .join("mentor.md");
        if let Some(content) = read_if_exists(path) {
            self.directive = content;
        }
        self
    }

    /// Builds the directive text, appending the mood context when present.
    pub fn build(&self, mood: Option<Mood>) -> String {
        match mood {
            Some(mood) => format!("{}\nKayfiyat: {}", self.directive, mood.label()),
            None => self.directive.clone(),
        }
    }
}

impl Default for PersonaBuilder {
    fn default() -> Self {
        Self::new()
    }
}
