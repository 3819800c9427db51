//! Lmchat is a full-screen terminal chat client for locally hosted,
//! OpenAI-compatible model servers such as LM Studio.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns conversation state, the streamed-turn state machine,
//!   and the SSE consumer that feeds it.
//! - [`ui`] renders the terminal interface and runs the interactive event
//!   loop that drives user input and display updates.
//! - [`commands`] implements slash-command parsing and command execution
//!   used by the chat loop.
//! - [`api`] defines the chat and model-list payloads exchanged with the
//!   server.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which initializes and dispatches into
//! [`core::app`] and [`ui::chat_loop`] for interactive sessions.

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod ui;
pub mod utils;
