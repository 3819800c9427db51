//! Slash commands typed into the chat input

use crate::core::app::App;

pub enum CommandResult {
    Continue,
    ProcessAsMessage(String),
    OpenModelPicker,
}

/// Interpret one submitted input line. Anything that is not a recognized
/// command comes back as a message for the API, unknown slash commands
/// included.
pub fn process_input(app: &mut App, input: &str) -> CommandResult {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return CommandResult::Continue;
    }
    if !trimmed.starts_with('/') {
        return CommandResult::ProcessAsMessage(input.to_string());
    }

    let mut parts = trimmed[1..].splitn(2, ' ');
    let command_name = match parts.next() {
        Some(name) if !name.is_empty() => name,
        _ => return CommandResult::ProcessAsMessage(input.to_string()),
    };
    let args = parts.next().unwrap_or("").trim();

    match command_name {
        "help" => handle_help(app),
        "clear" => handle_clear(app),
        "model" => handle_model(app, args),
        "log" => handle_log(app, args),
        _ => CommandResult::ProcessAsMessage(input.to_string()),
    }
}

fn handle_help(app: &mut App) -> CommandResult {
    let help = [
        "Available commands:",
        "  /help            Show this help",
        "  /clear           Clear the conversation and start fresh",
        "  /model [id]      Pick a loaded model, or switch directly by id",
        "  /log [filename]  Log the conversation to a file, or /log to toggle pause/resume",
        "",
        "Keys:",
        "  Enter            Send the message",
        "  Esc              Interrupt the response being streamed",
        "  Up/Down          Scroll the transcript (mouse wheel works too)",
        "  Ctrl+C           Quit",
    ]
    .join("\n");
    app.add_system_message(help);
    CommandResult::Continue
}

fn handle_clear(app: &mut App) -> CommandResult {
    app.clear_conversation();
    CommandResult::Continue
}

fn handle_model(app: &mut App, args: &str) -> CommandResult {
    if args.is_empty() {
        return CommandResult::OpenModelPicker;
    }

    // No validation against the fetched list: the server is the authority
    // and rejects unknown ids on the next request
    app.select_model(args);
    app.add_system_message(format!("Switched to model: {args}"));
    CommandResult::Continue
}

fn handle_log(app: &mut App, args: &str) -> CommandResult {
    if args.is_empty() {
        let timestamp = chrono::Local::now()
            .format("%Y-%m-%d %H:%M:%S %Z")
            .to_string();
        let pause_message = if app.logging.is_active() {
            format!("Logging paused at {timestamp}")
        } else {
            format!("Logging resumed at {timestamp}")
        };

        match app.logging.toggle_logging(&pause_message) {
            Ok(message) => app.add_system_message(message),
            Err(e) => app.add_system_message(format!("Error: {e}")),
        }
    } else if args.split_whitespace().count() > 1 {
        app.add_system_message(
            "Usage: /log [filename] - Enable logging to file, or /log to toggle pause/resume"
                .to_string(),
        );
    } else {
        match app.logging.set_log_file(args.to_string()) {
            Ok(message) => app.add_system_message(message),
            Err(e) => app.add_system_message(format!("Error setting log file: {e}")),
        }
    }
    CommandResult::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::{create_test_app, create_test_message};

    #[test]
    fn empty_input_is_a_silent_no_op() {
        let mut app = create_test_app();

        assert!(matches!(
            process_input(&mut app, ""),
            CommandResult::Continue
        ));
        assert!(matches!(
            process_input(&mut app, "   \t "),
            CommandResult::Continue
        ));
        assert!(app.messages.is_empty());
    }

    #[test]
    fn plain_text_passes_through_unchanged() {
        let mut app = create_test_app();

        match process_input(&mut app, "hello there") {
            CommandResult::ProcessAsMessage(msg) => assert_eq!(msg, "hello there"),
            _ => panic!("expected ProcessAsMessage"),
        }
        assert!(app.messages.is_empty());
    }

    #[test]
    fn unknown_slash_commands_go_to_the_model() {
        let mut app = create_test_app();

        match process_input(&mut app, "/frobnicate now") {
            CommandResult::ProcessAsMessage(msg) => assert_eq!(msg, "/frobnicate now"),
            _ => panic!("expected ProcessAsMessage"),
        }
    }

    #[test]
    fn help_lists_the_commands_in_the_transcript() {
        let mut app = create_test_app();

        assert!(matches!(
            process_input(&mut app, "/help"),
            CommandResult::Continue
        ));

        let last = app.messages.back().unwrap();
        assert_eq!(last.role, "system");
        assert!(last.content.contains("/model"));
        assert!(last.content.contains("/log"));
    }

    #[test]
    fn clear_empties_the_transcript() {
        let mut app = create_test_app();
        app.messages.push_back(create_test_message("user", "Hello"));
        app.messages
            .push_back(create_test_message("assistant", "Hi there!"));

        assert!(matches!(
            process_input(&mut app, "/clear"),
            CommandResult::Continue
        ));
        assert!(app.messages.is_empty());
    }

    #[test]
    fn model_without_args_opens_the_picker() {
        let mut app = create_test_app();

        assert!(matches!(
            process_input(&mut app, "/model"),
            CommandResult::OpenModelPicker
        ));
    }

    #[test]
    fn model_with_id_switches_directly() {
        let mut app = create_test_app();
        app.messages.push_back(create_test_message("user", "Hello"));

        assert!(matches!(
            process_input(&mut app, "/model other-model"),
            CommandResult::Continue
        ));

        assert_eq!(app.model, "other-model");
        // History belongs to the old model and is gone; only the notice remains
        assert_eq!(app.messages.len(), 1);
        assert_eq!(app.messages[0].role, "system");
        assert_eq!(app.messages[0].content, "Switched to model: other-model");
    }

    #[test]
    fn log_toggle_without_a_file_reports_an_error() {
        let mut app = create_test_app();

        assert!(matches!(
            process_input(&mut app, "/log"),
            CommandResult::Continue
        ));

        let last = app.messages.back().unwrap();
        assert_eq!(last.role, "system");
        assert!(last.content.starts_with("Error: No log file specified"));
    }

    #[test]
    fn log_with_filename_enables_then_toggle_pauses() {
        let mut app = create_test_app();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.log");
        let path_str = path.to_str().unwrap().to_string();

        process_input(&mut app, &format!("/log {path_str}"));
        assert!(app.logging.is_active());
        assert!(app
            .messages
            .back()
            .unwrap()
            .content
            .starts_with("Logging enabled to: "));

        process_input(&mut app, "/log");
        assert!(!app.logging.is_active());
        assert!(app
            .messages
            .back()
            .unwrap()
            .content
            .starts_with("Logging paused"));
    }
}
