//! Model listing functionality
//!
//! Prints the chat-capable models the server has loaded, for shell use
//! without entering the full-screen interface.

use std::error::Error;

use crate::api::models::{fetch_models, selectable_model_ids};

pub async fn list_models(host: &str) -> Result<(), Box<dyn Error>> {
    let client = reqwest::Client::new();
    let models_response = fetch_models(&client, host).await?;

    println!("🤖 Available models on {host}");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();

    let ids = selectable_model_ids(&models_response);
    if ids.is_empty() {
        println!("No chat models are currently loaded.");
        println!("Load one in LM Studio and run this again.");
    } else {
        println!("Found {} loaded chat models:", ids.len());
        println!();
        for id in ids {
            println!("  • {id}");
        }
    }

    Ok(())
}
