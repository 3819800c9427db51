#[cfg(test)]
use crate::core::app::App;
#[cfg(test)]
use crate::core::message::Message;
#[cfg(test)]
use std::collections::VecDeque;

#[cfg(test)]
pub fn create_test_app() -> App {
    let mut app = App::new(
        "test-model".to_string(),
        "http://127.0.0.1:1234".to_string(),
        None,
    )
    .unwrap();
    app.available_models = vec!["test-model".to_string(), "other-model".to_string()];
    app
}

#[cfg(test)]
pub fn create_test_message(role: &str, content: &str) -> Message {
    Message {
        role: role.to_string(),
        content: content.to_string(),
    }
}

#[cfg(test)]
pub fn create_test_messages() -> VecDeque<Message> {
    let mut messages = VecDeque::new();
    messages.push_back(create_test_message("user", "Hello"));
    messages.push_back(create_test_message("assistant", "Hi there!"));
    messages.push_back(create_test_message("user", "How are you?"));
    messages.push_back(create_test_message(
        "assistant",
        "I'm doing well, thank you for asking!",
    ));
    messages
}
