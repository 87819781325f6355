// ABOUTME: Core domain types — moods, messages, chat sessions, and attachments.
// ABOUTME: Serialized field names are camelCase to match the stored session format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A descriptive mood tag attached to a session.
///
/// Persisted under the product's Uzbek labels, which are also what the
/// persona directive receives as context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mood {
    Stress,
    #[serde(rename = "Motivatsiya")]
    Motivation,
    #[serde(rename = "Qayg'u")]
    Sadness,
    #[serde(rename = "Izlanish")]
    Exploration,
    #[serde(rename = "Xotirjamlik")]
    Calm,
}

impl Mood {
    /// All moods, in menu order.
    pub const ALL: [Mood; 5] = [
        Mood::Stress,
        Mood::Motivation,
        Mood::Sadness,
        Mood::Exploration,
        Mood::Calm,
    ];

    /// The display label, identical to the persisted form.
    pub fn label(&self) -> &'static str {
        match self {
            Mood::Stress => "Stress",
            Mood::Motivation => "Motivatsiya",
            Mood::Sadness => "Qayg'u",
            Mood::Exploration => "Izlanish",
            Mood::Calm => "Xotirjamlik",
        }
    }

    /// Parse a label back into a mood, case-insensitively.
    pub fn from_label(label: &str) -> Option<Mood> {
        let wanted = label.trim().to_lowercase();
        Mood::ALL
            .into_iter()
            .find(|m| m.label().to_lowercase() == wanted)
    }
}

/// Light/dark display preference, persisted under its own storage entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Theme> {
        match tag.trim() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A citation returned alongside generated text when a tool was used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub title: String,
    pub uri: String,
}

/// An opaque image payload produced by the boundary (file picker analog).
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    /// Base64-encoded image bytes, without the data-URI prefix.
    pub data: String,
    pub mime_type: String,
}

impl Attachment {
    /// Render as a `data:` URI for display storage on the message.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// Geographic coordinates used as a retrieval bias for map lookups.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// A single chat message. Immutable once created; owned by its session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grounding_sources: Option<Vec<GroundingSource>>,
}

impl Message {
    /// Construct a user message, optionally carrying an attached image.
    pub fn user(content: &str, attachment: Option<&Attachment>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: Role::User,
            content: content.to_string(),
            image_url: attachment.map(Attachment::to_data_uri),
            timestamp: Utc::now(),
            grounding_sources: None,
        }
    }

    /// Construct an assistant message from generated output.
    pub fn assistant(
        content: String,
        image_url: Option<String>,
        grounding_sources: Option<Vec<GroundingSource>>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: Role::Assistant,
            content,
            image_url,
            timestamp: Utc::now(),
            grounding_sources,
        }
    }
}

/// One conversation thread with its own history and mood tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    pub mood: Option<Mood>,
    pub updated_at: DateTime<Utc>,
}
