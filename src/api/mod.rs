use serde::{Deserialize, Serialize};

#[derive(Serialize, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

#[derive(Deserialize)]
pub struct ChatResponseDelta {
    pub content: Option<String>,
}

#[derive(Deserialize)]
pub struct ChatResponseChoice {
    pub delta: ChatResponseDelta,
}

#[derive(Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatResponseChoice>,
}

/// One entry from `GET /api/v0/models`. The enhanced endpoint reports every
/// model the server knows about, including embedding models and models not
/// currently in memory.
#[derive(Deserialize)]
pub struct ModelEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub state: String,
}

impl ModelEntry {
    /// Chat candidates are LLMs currently loaded into memory.
    pub fn is_selectable(&self) -> bool {
        self.kind == "llm" && self.state == "loaded"
    }
}

#[derive(Deserialize)]
pub struct ModelsResponse {
    pub data: Vec<ModelEntry>,
}

pub mod models;
