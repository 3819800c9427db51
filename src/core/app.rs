use crate::core::constants::{DEFAULT_MODEL_ID, INPUT_AREA_HEIGHT};
use crate::core::message::Message;
use crate::core::turn::{TurnRenderer, TurnState};
use crate::ui::markdown;
use crate::ui::picker::{PickerItem, PickerState};
use crate::ui::theme::Theme;
use crate::utils::logging::LoggingState;
use crate::utils::scroll::ScrollCalculator;
use ratatui::text::Line;
use reqwest::Client;
use std::{collections::VecDeque, time::Instant};
use tokio_util::sync::CancellationToken;
use tracing::warn;

pub struct App {
    pub messages: VecDeque<Message>,
    pub input: String,
    pub input_cursor_position: usize,
    pub client: Client,
    pub model: String,
    pub base_url: String,
    pub available_models: Vec<String>,
    pub picker: Option<PickerState>,
    pub turn: TurnRenderer,
    pub theme: Theme,
    pub scroll_offset: u16,
    pub auto_scroll: bool,
    pub is_streaming: bool,
    pub pulse_start: Instant,
    pub logging: LoggingState,
    pub stream_cancel_token: Option<CancellationToken>,
    pub current_stream_id: u64,
}

impl App {
    pub fn new(
        model: String,
        base_url: String,
        log_file: Option<String>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let logging = LoggingState::new(log_file)?;

        Ok(App {
            messages: VecDeque::new(),
            input: String::new(),
            input_cursor_position: 0,
            client: Client::new(),
            model,
            base_url,
            available_models: vec![DEFAULT_MODEL_ID.to_string()],
            picker: None,
            turn: TurnRenderer::new(),
            theme: Theme::dark_default(),
            scroll_offset: 0,
            auto_scroll: true,
            is_streaming: false,
            pulse_start: Instant::now(),
            logging,
            stream_cancel_token: None,
            current_stream_id: 0,
        })
    }

    pub fn build_display_lines(&self) -> Vec<Line<'static>> {
        markdown::build_display_lines(&self.messages, &self.theme)
    }

    pub fn calculate_wrapped_line_count(&self, terminal_width: u16) -> u16 {
        let lines = self.build_display_lines();
        ScrollCalculator::calculate_wrapped_line_count(&lines, terminal_width)
    }

    pub fn calculate_max_scroll_offset(&self, available_height: u16, terminal_width: u16) -> u16 {
        let lines = self.build_display_lines();
        ScrollCalculator::calculate_max_scroll_offset(&lines, terminal_width, available_height)
    }

    /// Transcript rows left after the title line and the input box.
    pub fn calculate_available_height(&self, terminal_height: u16) -> u16 {
        terminal_height
            .saturating_sub(INPUT_AREA_HEIGHT)
            .saturating_sub(1)
    }

    /// Record a submitted user message, open the assistant entry that will
    /// receive the streamed reply, and return the request payload.
    pub fn add_user_message(&mut self, content: String) -> Vec<crate::api::ChatMessage> {
        if let Err(e) = self.logging.log_message(&format!("You: {content}")) {
            warn!("failed to log message: {e}");
        }

        self.messages.push_back(Message::user(content));
        self.messages.push_back(Message::assistant(String::new()));

        // Everything before the placeholder goes to the API, minus system
        // messages, which exist only on screen
        let mut api_messages = Vec::new();
        for msg in self.messages.iter().take(self.messages.len() - 1) {
            if msg.role == "user" || msg.role == "assistant" {
                api_messages.push(crate::api::ChatMessage {
                    role: msg.role.clone(),
                    content: msg.content.clone(),
                });
            }
        }
        api_messages
    }

    /// Append one streamed fragment to the turn and mirror the accumulated
    /// text into the last assistant entry.
    pub fn append_to_response(
        &mut self,
        content: &str,
        available_height: u16,
        terminal_width: u16,
    ) {
        self.turn.push_fragment(content);

        if let Some(last_msg) = self.messages.back_mut() {
            if last_msg.role == "assistant" {
                last_msg.content = self.turn.text().to_string();
            }
        }

        if self.auto_scroll {
            let total_wrapped_lines = self.calculate_wrapped_line_count(terminal_width);
            if total_wrapped_lines > available_height {
                self.scroll_offset = total_wrapped_lines.saturating_sub(available_height);
            } else {
                self.scroll_offset = 0;
            }
        }
    }

    pub fn add_system_message(&mut self, content: String) {
        self.messages.push_back(Message::system(content));
    }

    /// Keep the view pinned to the bottom while auto-scroll is engaged.
    pub fn update_scroll_position(&mut self, available_height: u16, terminal_width: u16) {
        if self.auto_scroll {
            let total_wrapped_lines = self.calculate_wrapped_line_count(terminal_width);
            if total_wrapped_lines > available_height {
                self.scroll_offset = total_wrapped_lines.saturating_sub(available_height);
            } else {
                self.scroll_offset = 0;
            }
        }
    }

    /// Scroll the transcript up one step and leave auto-scroll disengaged.
    pub fn scroll_up(&mut self, lines: u16) {
        self.auto_scroll = false;
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    /// Scroll the transcript down one step. Reaching the bottom re-engages
    /// auto-scroll.
    pub fn scroll_down(&mut self, lines: u16, available_height: u16, terminal_width: u16) {
        let max_scroll = self.calculate_max_scroll_offset(available_height, terminal_width);
        self.scroll_offset = (self.scroll_offset.saturating_add(lines)).min(max_scroll);
        if self.scroll_offset >= max_scroll {
            self.auto_scroll = true;
        } else {
            self.auto_scroll = false;
        }
    }

    pub fn get_logging_status(&self) -> String {
        self.logging.get_status_string()
    }

    pub fn cancel_current_stream(&mut self) {
        if let Some(token) = &self.stream_cancel_token {
            token.cancel();
        }
        self.stream_cancel_token = None;
        self.is_streaming = false;
        self.turn.cancel();
    }

    /// Tear down any in-flight stream and hand out the token and id for a
    /// fresh one. Replies still arriving under an older id are dropped by
    /// the event loop.
    pub fn start_new_stream(&mut self) -> (CancellationToken, u64) {
        self.cancel_current_stream();

        self.current_stream_id += 1;

        let token = CancellationToken::new();
        self.stream_cancel_token = Some(token.clone());
        self.is_streaming = true;
        self.pulse_start = Instant::now();

        let began = self.turn.begin();
        debug_assert!(began, "turn still streaming after cancel");

        (token, self.current_stream_id)
    }

    pub fn finalize_response(&mut self) {
        self.turn.complete();
        self.is_streaming = false;
        self.stream_cancel_token = None;

        // An end marker trailing a cancelled or failed turn must not log
        // the partial text as if the response had finished.
        if self.turn.state() == TurnState::Completed && !self.turn.text().is_empty() {
            if let Err(e) = self.logging.log_message(self.turn.text()) {
                warn!("failed to log response: {e}");
            }
        }
    }

    /// Mark the turn failed and surface the error in the transcript. The
    /// partial text already mirrored into the conversation stays visible.
    pub fn fail_response(&mut self, error: &str) {
        self.turn.fail();
        self.is_streaming = false;
        self.stream_cancel_token = None;
        self.add_system_message(format!("Error: {}", error.trim()));
    }

    /// Also cancels any in-flight request, so a dead stream cannot keep
    /// mutating a discarded conversation.
    pub fn clear_conversation(&mut self) {
        self.cancel_current_stream();
        self.messages.clear();
        self.turn.reset();
        self.scroll_offset = 0;
        self.auto_scroll = true;
    }

    /// Switch to a model and drop the history, which belongs to the old one.
    pub fn select_model(&mut self, model_id: &str) {
        self.clear_conversation();
        self.model = model_id.to_string();
    }

    pub fn open_model_picker(&mut self) {
        let items: Vec<PickerItem> = self
            .available_models
            .iter()
            .map(|id| PickerItem {
                id: id.clone(),
                label: id.clone(),
            })
            .collect();
        let selected = self
            .available_models
            .iter()
            .position(|id| *id == self.model)
            .unwrap_or(0);
        self.picker = Some(PickerState::new("Select Model", items, selected));
    }

    pub fn close_picker(&mut self) {
        self.picker = None;
    }

    /// Apply the highlighted picker entry, if any, and close the picker.
    pub fn apply_picker_selection(&mut self) {
        let selected = self
            .picker
            .as_ref()
            .and_then(|p| p.selected_id().map(str::to_string));
        self.close_picker();

        if let Some(model_id) = selected {
            self.select_model(&model_id);
            self.add_system_message(format!("Switched to model: {model_id}"));
        }
    }

    // Input cursor movement methods

    /// Move cursor to the beginning of the input (Ctrl+A)
    pub fn move_cursor_to_beginning(&mut self) {
        self.input_cursor_position = 0;
    }

    /// Move cursor to the end of the input (Ctrl+E)
    pub fn move_cursor_to_end(&mut self) {
        self.input_cursor_position = self.input.chars().count();
    }

    /// Move cursor one position to the left (Left Arrow)
    pub fn move_cursor_left(&mut self) {
        if self.input_cursor_position > 0 {
            self.input_cursor_position -= 1;
        }
    }

    /// Move cursor one position to the right (Right Arrow)
    pub fn move_cursor_right(&mut self) {
        let max_position = self.input.chars().count();
        if self.input_cursor_position < max_position {
            self.input_cursor_position += 1;
        }
    }

    // Input text manipulation methods

    /// Insert character at cursor position
    pub fn insert_char_at_cursor(&mut self, c: char) {
        let char_indices: Vec<_> = self.input.char_indices().collect();

        if self.input_cursor_position >= char_indices.len() {
            self.input.push(c);
        } else {
            let byte_index = char_indices[self.input_cursor_position].0;
            self.input.insert(byte_index, c);
        }

        self.input_cursor_position += 1;
    }

    /// Insert string at cursor position
    pub fn insert_str_at_cursor(&mut self, s: &str) {
        let char_indices: Vec<_> = self.input.char_indices().collect();

        if self.input_cursor_position >= char_indices.len() {
            self.input.push_str(s);
        } else {
            let byte_index = char_indices[self.input_cursor_position].0;
            self.input.insert_str(byte_index, s);
        }

        self.input_cursor_position += s.chars().count();
    }

    /// Delete character before cursor (backspace)
    pub fn delete_char_before_cursor(&mut self) -> bool {
        if self.input_cursor_position == 0 {
            return false;
        }

        let char_indices: Vec<_> = self.input.char_indices().collect();

        if self.input_cursor_position <= char_indices.len() {
            let char_to_remove_index = self.input_cursor_position - 1;

            if char_to_remove_index < char_indices.len() {
                let byte_start = char_indices[char_to_remove_index].0;
                let byte_end = if char_to_remove_index + 1 < char_indices.len() {
                    char_indices[char_to_remove_index + 1].0
                } else {
                    self.input.len()
                };

                self.input.drain(byte_start..byte_end);
                self.input_cursor_position -= 1;
                return true;
            }
        }

        false
    }

    /// Clear input and reset cursor
    pub fn clear_input(&mut self) {
        self.input.clear();
        self.input_cursor_position = 0;
    }
}
