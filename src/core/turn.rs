//! State machine for a single streamed assistant turn

/// Lifecycle of one turn. The terminal states never transition back to
/// `Streaming`; a new turn starts over via [`TurnRenderer::begin`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    Streaming,
    Completed,
    Cancelled,
    Failed,
}

/// Accumulates the assistant text for the turn currently being streamed.
///
/// The event loop feeds it fragments in arrival order and drives the state
/// transitions; the conversation mirrors the growing text into its last
/// assistant entry.
#[derive(Debug)]
pub struct TurnRenderer {
    state: TurnState,
    text: String,
}

impl TurnRenderer {
    pub fn new() -> Self {
        Self {
            state: TurnState::Idle,
            text: String::new(),
        }
    }

    /// Begin a new turn, clearing any previous turn's text. Refused while a
    /// turn is still streaming, so one response stream can never be consumed
    /// into a renderer that is already consuming another.
    pub fn begin(&mut self) -> bool {
        if self.state == TurnState::Streaming {
            return false;
        }
        self.state = TurnState::Streaming;
        self.text.clear();
        true
    }

    /// Append one fragment in arrival order. Dropped outside `Streaming`.
    pub fn push_fragment(&mut self, fragment: &str) {
        if self.state == TurnState::Streaming {
            self.text.push_str(fragment);
        }
    }

    pub fn complete(&mut self) {
        if self.state == TurnState::Streaming {
            self.state = TurnState::Completed;
        }
    }

    pub fn cancel(&mut self) {
        if self.state == TurnState::Streaming {
            self.state = TurnState::Cancelled;
        }
    }

    pub fn fail(&mut self) {
        if self.state == TurnState::Streaming {
            self.state = TurnState::Failed;
        }
    }

    /// Drop the current turn entirely, as when the transcript is cleared.
    pub fn reset(&mut self) {
        self.state = TurnState::Idle;
        self.text.clear();
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn is_streaming(&self) -> bool {
        self.state == TurnState::Streaming
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Default for TurnRenderer {
    fn default() -> Self {
        Self::new()
    }
}
