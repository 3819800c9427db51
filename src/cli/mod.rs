//! Command-line interface parsing and handling
//!
//! This module parses command-line arguments and dispatches to the chat
//! interface or the model listing.

pub mod model_list;

use std::error::Error;

use clap::Parser;

use crate::cli::model_list::list_models;
use crate::core::constants::{DEFAULT_MODEL_ID, DEFAULT_SERVER_HOST};
use crate::ui::chat_loop::run_chat;

#[derive(Parser)]
#[command(name = "lmchat")]
#[command(about = "A terminal chat client for a local LM Studio server")]
#[command(
    long_about = "Lmchat is a full-screen terminal chat client for a locally hosted, \
OpenAI-compatible model server such as LM Studio. It streams responses token by \
token, renders them as markdown, and keeps the whole conversation in scrollback.\n\n\
Controls:\n\
  Type              Enter your message in the input field\n\
  Enter             Send the message\n\
  Esc               Interrupt the response being streamed\n\
  Up/Down/Mouse     Scroll through chat history\n\
  Ctrl+C            Quit the application\n\n\
Commands:\n\
  /help             Show available commands and keys\n\
  /clear            Clear the conversation\n\
  /model [ID]       Pick a loaded model, or switch directly by id\n\
  /log <filename>   Enable logging to specified file\n\
  /log              Toggle logging pause/resume"
)]
pub struct Args {
    /// Model to use for chat, or list available models if no model specified
    #[arg(short = 'm', long, value_name = "MODEL", num_args = 0..=1, default_missing_value = "")]
    pub model: Option<String>,

    /// Base URL of the model server
    #[arg(long, value_name = "URL", default_value = DEFAULT_SERVER_HOST)]
    pub host: String,

    /// Enable logging to specified file
    #[arg(short = 'l', long, value_name = "FILE")]
    pub log: Option<String>,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    // Diagnostics go to stderr so a redirect can capture them without
    // fighting the alternate screen. Silent unless RUST_LOG is set.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    match args.model.as_deref() {
        // -m was provided without a value, list available models
        Some("") => list_models(&args.host).await,
        Some(model) => run_chat(model.to_string(), args.host, args.log).await,
        None => run_chat(DEFAULT_MODEL_ID.to_string(), args.host, args.log).await,
    }
}
