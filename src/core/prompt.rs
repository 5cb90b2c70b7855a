//! Prompt formatting for Mistral-style instruction models.

use super::types::{ChatRole, Message};

const TURN_SEPARATOR: &str = "\n";

/// Render a conversation as a single prompt string.
///
/// User turns are wrapped as `<s>[INST] ... [/INST]`, assistant turns are
/// inserted verbatim, and turns are joined with a newline in conversation
/// order.
pub fn format_prompt(messages: &[Message]) -> String {
    messages
        .iter()
        .map(format_turn)
        .collect::<Vec<_>>()
        .join(TURN_SEPARATOR)
}

fn format_turn(message: &Message) -> String {
    match message.role {
        ChatRole::User => format!("<s>[INST] {} [/INST]", message.content),
        ChatRole::Assistant => message.content.clone(),
    }
}
