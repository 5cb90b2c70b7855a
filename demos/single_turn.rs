/// Sends one message and prints the reply, with request/response inspection.
///
/// Reads the token from `HF_TOKEN` (a `.env` file works too) and keeps it in
/// an in-memory store, so nothing is written to disk.
///
/// Run with: cargo run --example single-turn -- "Explain ownership in Rust"
use std::sync::Arc;
use std::time::Duration;

use dotenv::dotenv;
use sparkchat::{ChatSession, HttpClientConfig, HuggingFaceClient, HuggingFaceConfig, MemoryStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let prompt = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Tell me a random interesting fact about space.".to_string());

    let config = HuggingFaceConfig::from_env()
        // No timeout by default; a demo should not hang forever.
        .with_http_config(HttpClientConfig {
            timeout: Some(Duration::from_secs(60)),
            ..Default::default()
        })
        .with_request_inspector(|req| {
            println!("━━━ REQUEST ━━━");
            println!("{}", serde_json::to_string_pretty(req).unwrap_or_default());
        })
        .with_response_inspector(|res| {
            println!("━━━ RESPONSE ━━━");
            println!("{}", serde_json::to_string_pretty(res).unwrap_or_default());
        });

    let session = ChatSession::new(HuggingFaceClient::new(config)?, Arc::new(MemoryStore::new()))?;
    session.save_credential(&std::env::var("HF_TOKEN").unwrap_or_default())?;

    match session.send(&prompt).await {
        Ok(reply) => println!("━━━ REPLY ━━━\n{}", reply.content),
        Err(e) => println!("{}: {}", e.title(), e),
    }

    Ok(())
}
