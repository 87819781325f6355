// ABOUTME: Session store — owns the chat collection, active pointer, stars, and derived signals.
// ABOUTME: All mutation flows through a fixed set of transitions; every change is persisted in full.

use chrono::Utc;

use crate::agent::{GenerationProvider, GenerationRequest, HistoryEntry};
use crate::session::persistence::Storage;
use crate::session::signals;
use crate::types::{Attachment, ChatSession, Location, Message, Mood, Theme};

/// Placeholder title for a session whose first message had no usable text.
const DEFAULT_TITLE: &str = "Yangi muloqot";
/// Titles are cut to this many characters, ellipsis-suffixed when truncated.
const TITLE_LIMIT: usize = 40;

/// Everything the renderer reads: sessions (newest first), the active
/// pointer, loading flag, derived signals, and the star count.
#[derive(Debug)]
pub struct AppState {
    pub sessions: Vec<ChatSession>,
    pub active_session_id: Option<String>,
    pub is_loading: bool,
    pub wisdom_of_the_day: Option<String>,
    pub current_task: Option<String>,
    pub stars: u32,
}

/// The result of one completed send round-trip.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub assistant: Message,
    /// True when the reply carried the reward token; the renderer shows a
    /// transient star effect for it.
    pub star_earned: bool,
}

/// Mood predicate for the session history view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoodFilter {
    All,
    Only(Mood),
}

/// State container for the chat application. Single-writer: transitions are
/// synchronous with respect to local state; the generation call is the only
/// suspension point and at most one is in flight.
pub struct SessionStore {
    state: AppState,
    theme: Theme,
    storage: Storage,
}

impl SessionStore {
    /// Hydrate prior state from storage. With `fresh` set, saved sessions are
    /// ignored; stars and theme load regardless.
    pub fn hydrate(storage: Storage, fresh: bool) -> Self {
        let sessions = if fresh {
            Vec::new()
        } else {
            storage.load_sessions()
        };
        let stars = storage.load_stars();
        let theme = storage.load_theme();
        Self {
            state: AppState {
                sessions,
                active_session_id: None,
                is_loading: false,
                wisdom_of_the_day: None,
                current_task: None,
                stars,
            },
            theme,
            storage,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn stars(&self) -> u32 {
        self.state.stars
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading
    }

    /// The session the active pointer references, if any.
    pub fn active_session(&self) -> Option<&ChatSession> {
        let id = self.state.active_session_id.as_ref()?;
        self.state.sessions.iter().find(|s| s.id == *id)
    }

    /// Clear the active pointer and derived signals; existing sessions stay.
    pub fn start_new_session(&mut self) {
        self.state.active_session_id = None;
        self.state.wisdom_of_the_day = None;
        self.state.current_task = None;
    }

    /// Point at an existing session. Unknown ids are ignored.
    pub fn select_session(&mut self, id: &str) {
        if self.state.sessions.iter().any(|s| s.id == id) {
            self.state.active_session_id = Some(id.to_string());
        }
    }

    /// Remove a session. Clears the active pointer when it pointed at the
    /// removed session. Idempotent.
    pub fn delete_session(&mut self, id: &str) {
        let before = self.state.sessions.len();
        self.state.sessions.retain(|s| s.id != id);
        if self.state.sessions.len() == before {
            return;
        }
        if self.state.active_session_id.as_deref() == Some(id) {
            self.state.active_session_id = None;
        }
        self.persist_sessions();
    }

    /// Empty the whole session collection. Stars are untouched. The yes/no
    /// confirmation lives at the boundary, before this is called.
    pub fn clear_all_sessions(&mut self) {
        self.state.sessions.clear();
        self.state.active_session_id = None;
        self.state.wisdom_of_the_day = None;
        self.state.current_task = None;
        self.persist_sessions();
    }

    /// Flip the theme preference and persist it.
    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        if let Err(e) = self.storage.save_theme(self.theme) {
            eprintln!("Warning: failed to save theme: {}", e);
        }
        self.theme
    }

    /// Derived view: sessions whose title or message content contains the
    /// search term (case-insensitive) and whose mood passes the filter.
    pub fn filter_sessions(&self, term: &str, filter: MoodFilter) -> Vec<&ChatSession> {
        let needle = term.to_lowercase();
        self.state
            .sessions
            .iter()
            .filter(|session| {
                let matches_search = session.title.to_lowercase().contains(&needle)
                    || session
                        .messages
                        .iter()
                        .any(|m| m.content.to_lowercase().contains(&needle));
                let matches_mood = match filter {
                    MoodFilter::All => true,
                    MoodFilter::Only(mood) => session.mood == Some(mood),
                };
                matches_search && matches_mood
            })
            .collect()
    }

    /// Send a message through the full round-trip: append the user message
    /// (creating a session when none is active), call the provider, apply
    /// reward and signal scanning, append the assistant reply.
    ///
    /// Returns None without touching any state when the content is blank with
    /// no attachment, or when a call is already in flight.
    pub async fn send_message(
        &mut self,
        provider: &dyn GenerationProvider,
        content: &str,
        attachment: Option<Attachment>,
        mood_override: Option<Mood>,
        location: Option<Location>,
    ) -> Option<TurnOutcome> {
        if content.trim().is_empty() && attachment.is_none() {
            return None;
        }
        if self.state.is_loading {
            return None;
        }

        let user_msg = Message::user(content, attachment.as_ref());

        let active_idx = self
            .state
            .active_session_id
            .as_ref()
            .and_then(|id| self.state.sessions.iter().position(|s| s.id == *id));

        let (session_id, history, effective_mood) = match active_idx {
            Some(idx) => {
                let session = &mut self.state.sessions[idx];
                let history = session
                    .messages
                    .iter()
                    .map(|m| HistoryEntry {
                        role: m.role,
                        content: m.content.clone(),
                    })
                    .collect();
                session.messages.push(user_msg);
                session.updated_at = Utc::now();
                if mood_override.is_some() {
                    session.mood = mood_override;
                }
                (session.id.clone(), history, session.mood)
            }
            None => {
                let session = ChatSession {
                    id: uuid::Uuid::new_v4().to_string(),
                    title: derive_title(content),
                    messages: vec![user_msg],
                    mood: mood_override,
                    updated_at: Utc::now(),
                };
                let id = session.id.clone();
                // Newest first.
                self.state.sessions.insert(0, session);
                self.state.active_session_id = Some(id.clone());
                (id, Vec::new(), mood_override)
            }
        };

        self.state.is_loading = true;
        self.persist_sessions();

        let request = GenerationRequest {
            prompt: content.to_string(),
            history,
            mood: effective_mood,
            attachment,
            location,
        };
        let result = provider.generate(&request).await;

        let star_earned = signals::contains_reward_token(&result.text);
        if star_earned {
            self.state.stars += 1;
            if let Err(e) = self.storage.save_stars(self.state.stars) {
                eprintln!("Warning: failed to save stars: {}", e);
            }
        }
        if let Some(wisdom) = signals::extract_marker(&result.text, signals::WISDOM_MARKER) {
            self.state.wisdom_of_the_day = Some(wisdom);
        }
        if let Some(task) = signals::extract_marker(&result.text, signals::TASK_MARKER) {
            self.state.current_task = Some(task);
        }

        let assistant = Message::assistant(result.text, result.image_url, result.grounding_sources);
        if let Some(session) = self.state.sessions.iter_mut().find(|s| s.id == session_id) {
            session.messages.push(assistant.clone());
            session.updated_at = Utc::now();
        }

        self.state.is_loading = false;
        self.persist_sessions();

        Some(TurnOutcome {
            assistant,
            star_earned,
        })
    }

    fn persist_sessions(&self) {
        if let Err(e) = self.storage.save_sessions(&self.state.sessions) {
            eprintln!("Warning: failed to save sessions: {}", e);
        }
    }
}

/// First 40 characters of the content, ellipsis-suffixed when truncated;
/// whitespace-only content falls back to the placeholder title.
fn derive_title(content: &str) -> String {
    if content.trim().is_empty() {
        return DEFAULT_TITLE.to_string();
    }
    let title: String = content.chars().take(TITLE_LIMIT).collect();
    if content.chars().count() > TITLE_LIMIT {
        format!("{}...", title)
    } else {
        title
    }
}
