//! Transcript entry type shared by the app state, display layer, and logging.

/// A single transcript entry.
///
/// Roles are `"user"` and `"assistant"` for turns exchanged with the server,
/// plus `"system"` for app-authored notices (errors, command output) that are
/// shown in the transcript but never sent to the API.
#[derive(Debug, Clone)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }
}
