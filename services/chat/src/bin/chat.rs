//! services/chat/src/bin/chat.rs
//!
//! Interactive command surface over the chat core: load files into the
//! knowledge base, ask questions, watch the answer stream in. This is a thin
//! collaborator shell; all real behavior lives in the library.

use async_openai::{config::OpenAIConfig, Client};
use chat_lib::{
    adapters::{format_bytes, read_documents, OpenAiOracleAdapter},
    chat::{submit_question, Conversation, TurnOutcome},
    config::Config,
    error::AppError,
};
use rag_chat_core::ports::GenerationService;
use std::io::Write as _;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Model: {}", config.chat_model);

    // --- 2. Initialize the Oracle Adapter ---
    let mut openai_config = OpenAIConfig::new().with_api_key(&config.openai_api_key);
    if let Some(api_base) = &config.api_base {
        openai_config = openai_config.with_api_base(api_base);
    }
    let client = Client::with_config(openai_config);
    let oracle: Arc<dyn GenerationService> =
        Arc::new(OpenAiOracleAdapter::new(client, config.chat_model.clone()));

    // --- 3. Interactive Loop ---
    println!("In-context RAG chat. Knowledge base and history last for this session only.");
    println!("Commands: /load <paths...>  /docs  /drop <id>  /quit");
    println!("Anything else is sent as a question. Ctrl-C cancels a streaming answer.");

    let mut conversation = Conversation::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix("/load") {
            handle_load(&mut conversation, rest).await;
        } else if line == "/docs" {
            handle_docs(&conversation);
        } else if let Some(rest) = line.strip_prefix("/drop") {
            handle_drop(&mut conversation, rest.trim());
        } else if line == "/quit" {
            break;
        } else {
            ask(&mut conversation, oracle.as_ref(), &line).await;
        }
    }

    Ok(())
}

/// Reads every named file; a failing file gets its own notice and the rest
/// of the batch still loads.
async fn handle_load(conversation: &mut Conversation, args: &str) {
    let paths: Vec<&str> = args.split_whitespace().collect();
    if paths.is_empty() {
        println!("Usage: /load <paths...>");
        return;
    }

    for result in read_documents(&paths).await {
        match result {
            Ok(doc) => {
                println!(
                    "Loaded {} ({}, {}) id={}",
                    doc.name,
                    doc.mime_type,
                    format_bytes(doc.byte_size),
                    doc.id
                );
                conversation.add_document(doc);
            }
            Err(e) => println!("Could not load file: {}", e),
        }
    }
}

fn handle_docs(conversation: &Conversation) {
    if conversation.documents().is_empty() {
        println!("No documents loaded.");
        return;
    }
    for doc in conversation.documents() {
        println!(
            "{}  {}  ({}, {})",
            doc.id,
            doc.name,
            doc.mime_type,
            format_bytes(doc.byte_size)
        );
    }
}

fn handle_drop(conversation: &mut Conversation, arg: &str) {
    match Uuid::parse_str(arg) {
        Ok(id) => {
            if conversation.remove_document(&id) {
                println!("Removed document {}.", id);
            } else {
                println!("No document with id {}.", id);
            }
        }
        Err(_) => println!("Usage: /drop <document id>"),
    }
}

/// Submits one question and prints the answer as it streams. Each increment
/// carries the full accumulated text, so only the unseen suffix is printed.
async fn ask(conversation: &mut Conversation, oracle: &dyn GenerationService, question: &str) {
    let token = CancellationToken::new();
    let ctrl_c_watcher = tokio::spawn({
        let token = token.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                token.cancel();
            }
        }
    });

    let mut printed = 0usize;
    let outcome = submit_question(conversation, oracle, question, &token, |accumulated| {
        print!("{}", &accumulated[printed..]);
        let _ = std::io::stdout().flush();
        printed = accumulated.len();
    })
    .await;
    ctrl_c_watcher.abort();

    match outcome {
        TurnOutcome::Answered => println!(),
        TurnOutcome::Cancelled => println!("\n[answer cancelled]"),
        TurnOutcome::Failed => {
            // The fixed failure text is already settled in the message.
            if let Some(msg) = conversation.messages().last() {
                println!("\n{}", msg.text);
            }
        }
        TurnOutcome::RejectedEmpty | TurnOutcome::RejectedBusy => {}
    }
}
