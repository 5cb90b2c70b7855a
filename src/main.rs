use std::sync::Arc;

use sparkchat::{
    ChatError, ChatRole, ChatSession, FileStore, HuggingFaceClient, HuggingFaceConfig,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

const STORE_ENV_VAR: &str = "SPARKCHAT_STORE";

fn print_help() {
    println!(
        "\
sparkchat v{}

Chat with a hosted instruction-tuned model from the terminal.

USAGE:
    sparkchat [OPTIONS]

OPTIONS:
    -h, --help       Print this help message and exit
    -V, --version    Print version and exit

COMMANDS (inside the chat):
    /token <value>   Save your Hugging Face token
    /token clear     Forget the saved token
    /history         Show the conversation so far
    /help            Show these commands
    /quit            Leave
    //text           Send a message that starts with '/'

ENVIRONMENT VARIABLES:
    RUST_LOG              Log level filter (e.g. debug, sparkchat=debug)
    SPARKCHAT_STORE       Path of the key-value file holding the token
    SPARKCHAT_BASE_URL    Inference API base URL
    SPARKCHAT_MODEL       Model id (default: {})",
        env!("CARGO_PKG_VERSION"),
        sparkchat::provider::DEFAULT_MODEL,
    );
}

fn notice(title: &str, description: &str) {
    println!("[{title}] {description}");
}

fn report(err: &ChatError) {
    notice(err.title(), &err.to_string());
}

fn print_message(role: ChatRole, content: &str) {
    match role {
        ChatRole::User => println!("you> {content}"),
        ChatRole::Assistant => println!("Spark-AI> {content}"),
    }
}

fn open_store() -> Result<FileStore, ChatError> {
    match std::env::var(STORE_ENV_VAR) {
        Ok(path) if !path.trim().is_empty() => Ok(FileStore::new(path.trim())),
        _ => FileStore::default_location(),
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Command { name: &'a str, argument: &'a str },
    Message(&'a str),
}

/// A leading `/` starts a command; `//` sends the rest with one `/` dropped.
fn parse_line(line: &str) -> Input<'_> {
    let line = line.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim_start();

    if trimmed.starts_with("//") {
        return Input::Message(&trimmed[1..]);
    }

    match trimmed.strip_prefix('/') {
        Some(command) => {
            let command = command.trim_end();
            let (name, argument) = command
                .split_once(char::is_whitespace)
                .map(|(name, rest)| (name, rest.trim()))
                .unwrap_or((command, ""));
            Input::Command { name, argument }
        }
        None => Input::Message(line),
    }
}

/// Returns `false` when the user asked to leave.
async fn handle_line(session: &ChatSession, line: &str) -> bool {
    let (name, argument) = match parse_line(line) {
        Input::Command { name, argument } => (name, argument),
        Input::Message(text) => {
            match session.send(text).await {
                Ok(reply) => print_message(reply.role, &reply.content),
                Err(err) => report(&err),
            }
            return true;
        }
    };

    match name {
        "quit" | "exit" => return false,
        "help" => print_help(),
        "history" => {
            let messages = session.messages();
            if messages.is_empty() {
                notice("History", "No messages yet");
            }
            for message in messages {
                print_message(message.role, &message.content);
            }
        }
        "token" if argument == "clear" => match session.clear_credential() {
            Ok(()) => notice("Token Cleared", "Your Hugging Face token has been removed"),
            Err(err) => report(&err),
        },
        "token" if argument.is_empty() => {
            if session.is_authenticated() {
                notice("Token", "A Hugging Face token is saved");
            } else {
                notice("Token", "No token saved. Use /token <value>");
            }
        }
        "token" => match session.save_credential(argument) {
            Ok(()) => notice("Token Saved", "Your Hugging Face token has been saved"),
            Err(err) => report(&err),
        },
        other => notice(
            "Error",
            &format!("Unknown command: /{other}. Start with // to send it as a message"),
        ),
    }
    true
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("sparkchat v{}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            other => {
                eprintln!("Unknown argument: {other}");
                print_help();
                std::process::exit(2);
            }
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let client = HuggingFaceClient::new(HuggingFaceConfig::from_env())?;
    let model = client.config().model.clone();
    let session = ChatSession::new(client, Arc::new(open_store()?))?;

    println!("Spark-AI  ({model})");
    println!();
    println!("What can I help with?");
    if !session.is_authenticated() {
        println!("Please enter your Hugging Face token with /token <value> to start chatting.");
    }
    println!("Spark-AI can make mistakes. Check important info. Type /help for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        // The next line is only read once the previous send has resolved.
        if !handle_line(&session, &line).await {
            break;
        }
    }

    Ok(())
}
