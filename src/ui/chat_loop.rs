//! Main chat event loop
//!
//! Owns the terminal session: raw mode setup and restore, the draw/poll
//! cycle, key and mouse dispatch, and draining streamed fragments into
//! the conversation.

use std::{error::Error, io, sync::Arc, time::Duration};

use ratatui::crossterm::{
    event::{
        self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste,
        EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::Mutex;
use tracing::warn;

use crate::api::models::{fetch_models, selectable_model_ids};
use crate::commands::{process_input, CommandResult};
use crate::core::app::App;
use crate::core::chat_stream::{ChatStreamService, StreamMessage, StreamParams};
use crate::ui::renderer::ui;

/// Prepare pasted text for the single-line input: tabs become spaces,
/// line breaks collapse to single spaces, remaining control characters
/// are dropped.
fn sanitize_paste(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace(['\r', '\n'], " ")
        .replace('\t', "    ")
        .chars()
        .filter(|c| !c.is_control())
        .collect()
}

/// Run the interactive chat session until the user quits.
pub async fn run_chat(
    model: String,
    base_url: String,
    log_file: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let mut app = App::new(model, base_url, log_file)?;

    // Model discovery is best effort. An unreachable server still gets a
    // usable session; each completion request reports its own errors.
    match fetch_models(&app.client, &app.base_url).await {
        Ok(models) => {
            let ids = selectable_model_ids(&models);
            if ids.is_empty() {
                warn!(base_url = %app.base_url, "server reported no loaded chat models");
            } else {
                app.available_models = ids;
            }
        }
        Err(e) => {
            warn!(base_url = %app.base_url, "could not fetch model list: {e}");
        }
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableBracketedPaste,
        EnableMouseCapture
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let app = Arc::new(Mutex::new(app));
    let (stream_service, mut rx) = ChatStreamService::new();

    let result = 'main_loop: loop {
        {
            let app_guard = app.lock().await;
            terminal.draw(|f| ui(f, &app_guard))?;
        }
        // Cache terminal size for this tick
        let term_size = terminal.size().unwrap_or_default();

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    // Always allow Ctrl+C to quit, even when the picker is open
                    if matches!(key.code, KeyCode::Char('c'))
                        && key.modifiers.contains(event::KeyModifiers::CONTROL)
                    {
                        break 'main_loop Ok(());
                    }

                    // While the picker is open it owns the keyboard
                    {
                        let mut app_guard = app.lock().await;
                        if app_guard.picker.is_some() {
                            match key.code {
                                KeyCode::Up | KeyCode::Char('k') => {
                                    if let Some(picker) = &mut app_guard.picker {
                                        picker.move_up();
                                    }
                                }
                                KeyCode::Down | KeyCode::Char('j')
                                    if !key.modifiers.contains(event::KeyModifiers::CONTROL) =>
                                {
                                    if let Some(picker) = &mut app_guard.picker {
                                        picker.move_down();
                                    }
                                }
                                KeyCode::Enter => {
                                    app_guard.apply_picker_selection();
                                    let available_height =
                                        app_guard.calculate_available_height(term_size.height);
                                    app_guard
                                        .update_scroll_position(available_height, term_size.width);
                                }
                                KeyCode::Esc => {
                                    app_guard.close_picker();
                                }
                                _ => {}
                            }
                            continue;
                        }
                    }

                    match key.code {
                        KeyCode::Esc => {
                            let mut app_guard = app.lock().await;
                            if app_guard.is_streaming {
                                app_guard.cancel_current_stream();
                            }
                        }
                        KeyCode::Enter => {
                            let mut app_guard = app.lock().await;
                            if app_guard.input.trim().is_empty() {
                                continue;
                            }
                            let input = app_guard.input.clone();
                            app_guard.clear_input();

                            let available_height =
                                app_guard.calculate_available_height(term_size.height);

                            match process_input(&mut app_guard, &input) {
                                CommandResult::Continue => {
                                    app_guard
                                        .update_scroll_position(available_height, term_size.width);
                                }
                                CommandResult::OpenModelPicker => {
                                    app_guard.open_model_picker();
                                }
                                CommandResult::ProcessAsMessage(message) => {
                                    // A new submission always rejoins the live tail
                                    app_guard.auto_scroll = true;
                                    let (cancel_token, stream_id) = app_guard.start_new_stream();
                                    let api_messages = app_guard.add_user_message(message);
                                    app_guard
                                        .update_scroll_position(available_height, term_size.width);

                                    let client = app_guard.client.clone();
                                    let model = app_guard.model.clone();
                                    let base_url = app_guard.base_url.clone();
                                    drop(app_guard);

                                    // Spawn without holding the app lock
                                    stream_service.spawn_stream(StreamParams {
                                        client,
                                        base_url,
                                        model,
                                        api_messages,
                                        cancel_token,
                                        stream_id,
                                    });
                                }
                            }
                        }
                        KeyCode::Char('a')
                            if key.modifiers.contains(event::KeyModifiers::CONTROL) =>
                        {
                            let mut app_guard = app.lock().await;
                            app_guard.move_cursor_to_beginning();
                        }
                        KeyCode::Char('e')
                            if key.modifiers.contains(event::KeyModifiers::CONTROL) =>
                        {
                            let mut app_guard = app.lock().await;
                            app_guard.move_cursor_to_end();
                        }
                        KeyCode::Char(c)
                            if !key.modifiers.contains(event::KeyModifiers::CONTROL) =>
                        {
                            let mut app_guard = app.lock().await;
                            app_guard.insert_char_at_cursor(c);
                        }
                        KeyCode::Backspace => {
                            let mut app_guard = app.lock().await;
                            app_guard.delete_char_before_cursor();
                        }
                        KeyCode::Left => {
                            let mut app_guard = app.lock().await;
                            app_guard.move_cursor_left();
                        }
                        KeyCode::Right => {
                            let mut app_guard = app.lock().await;
                            app_guard.move_cursor_right();
                        }
                        KeyCode::Up => {
                            let mut app_guard = app.lock().await;
                            app_guard.scroll_up(1);
                        }
                        KeyCode::Down => {
                            let mut app_guard = app.lock().await;
                            let available_height =
                                app_guard.calculate_available_height(term_size.height);
                            app_guard.scroll_down(1, available_height, term_size.width);
                        }
                        _ => {}
                    }
                }
                Event::Paste(text) => {
                    let mut app_guard = app.lock().await;
                    let sanitized = sanitize_paste(&text);
                    app_guard.insert_str_at_cursor(&sanitized);
                }
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::ScrollUp => {
                        let mut app_guard = app.lock().await;
                        app_guard.scroll_up(3);
                    }
                    MouseEventKind::ScrollDown => {
                        let mut app_guard = app.lock().await;
                        let available_height =
                            app_guard.calculate_available_height(term_size.height);
                        app_guard.scroll_down(3, available_height, term_size.width);
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        // Drain whatever the stream task produced since the last frame
        let mut received_any = false;
        {
            let mut app_guard = app.lock().await;
            let available_height = app_guard.calculate_available_height(term_size.height);
            while let Ok((message, msg_stream_id)) = rx.try_recv() {
                // Output from a superseded request
                if msg_stream_id != app_guard.current_stream_id {
                    continue;
                }
                match message {
                    StreamMessage::Chunk(content) => {
                        app_guard.append_to_response(&content, available_height, term_size.width);
                    }
                    StreamMessage::Error(error) => {
                        app_guard.fail_response(&error);
                        app_guard.update_scroll_position(available_height, term_size.width);
                    }
                    StreamMessage::End => {
                        app_guard.finalize_response();
                    }
                }
                received_any = true;
            }
        }
        if received_any {
            continue; // Force a redraw after processing all updates
        }
    };

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}
