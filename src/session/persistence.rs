// ABOUTME: Durable storage — three independent entries: sessions, theme, and stars.
// ABOUTME: Full rewrites with atomic renames; corrupt entries hydrate as absent, never fatal.

use std::path::{Path, PathBuf};

use crate::types::{ChatSession, Theme};

const SESSIONS_FILE: &str = "sessions.json";
const THEME_FILE: &str = "theme";
const STARS_FILE: &str = "stars";

/// File-backed storage rooted at a single directory.
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Default storage root under the platform data directory.
    pub fn default_root() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("adib")
    }

    fn sessions_path(&self) -> PathBuf {
        self.root.join(SESSIONS_FILE)
    }

    fn theme_path(&self) -> PathBuf {
        self.root.join(THEME_FILE)
    }

    fn stars_path(&self) -> PathBuf {
        self.root.join(STARS_FILE)
    }

    /// Load the session collection. Missing or unparseable data yields an
    /// empty list; a parse failure is logged as a warning.
    pub fn load_sessions(&self) -> Vec<ChatSession> {
        let path = self.sessions_path();
        let Ok(content) = std::fs::read_to_string(&path) else {
            return Vec::new();
        };
        match serde_json::from_str(&content) {
            Ok(sessions) => sessions,
            Err(e) => {
                eprintln!("Warning: failed to parse saved sessions, starting empty: {}", e);
                Vec::new()
            }
        }
    }

    /// Save the full session collection (atomic write via tmp + rename).
    pub fn save_sessions(&self, sessions: &[ChatSession]) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(sessions)?;
        write_atomic(&self.sessions_path(), &content)
    }

    /// Load the theme preference, defaulting to light.
    pub fn load_theme(&self) -> Theme {
        std::fs::read_to_string(self.theme_path())
            .ok()
            .and_then(|tag| Theme::from_tag(&tag))
            .unwrap_or(Theme::Light)
    }

    pub fn save_theme(&self, theme: Theme) -> anyhow::Result<()> {
        write_atomic(&self.theme_path(), theme.tag())
    }

    /// Load the star count, defaulting to zero on any problem.
    pub fn load_stars(&self) -> u32 {
        std::fs::read_to_string(self.stars_path())
            .ok()
            .and_then(|text| text.trim().parse().ok())
            .unwrap_or(0)
    }

    pub fn save_stars(&self, stars: u32) -> anyhow::Result<()> {
        write_atomic(&self.stars_path(), &stars.to_string())
    }
}

/// Write a file atomically: create the parent, write a tmp sibling, rename.
fn write_atomic(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("tmp");
    std::fs::write(&tmp_path, content)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}
