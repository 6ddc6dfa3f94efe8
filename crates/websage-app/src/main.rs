//! Websage application binary - composition root.
//!
//! Ties together all Websage crates into a single terminal chat loop:
//! 1. Load configuration from TOML
//! 2. Read API credentials from the environment (fatal if missing)
//! 3. Build the search client, model client, and orchestrator
//! 4. Run the interactive REPL (one input at a time, streamed output)
//!
//! REPL commands:
//! - `/new` archives the current chat and starts a fresh one
//! - `/history` lists archived chats, most recent first
//! - `/find <text>` searches archived chats for a substring
//! - `/quit` exits
//!
//! Any input starting with `search:` returns raw search results without
//! calling the model.

mod cli;

use std::io::Write as _;
use std::time::Duration;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use websage_chat::{ChatOrchestrator, ChatSession, SEARCH_PREFIX};
use websage_core::{Credentials, WebsageConfig};
use websage_llm::{AnswerGenerator, GeminiClient};
use websage_search::GoogleSearchClient;

use cli::CliArgs;

/// Print the delta between the previous cumulative partial and this one.
///
/// When the new partial is not an extension of what is already on screen
/// (the generator fell back to another variant and restarted), the text
/// is reprinted in full on a new line.
fn render_partial(partial: &str, printed: &mut String) {
    match partial.strip_prefix(printed.as_str()) {
        Some(delta) => print!("{delta}"),
        None => {
            println!();
            print!("{partial}");
        }
    }
    printed.clear();
    printed.push_str(partial);
    let _ = std::io::stdout().flush();
}

/// List archived chats, most recent first.
fn print_history(session: &ChatSession) {
    let archive = session.archive();
    if archive.is_empty() {
        println!("No archived chats yet. Use /new to archive the current chat.");
        return;
    }
    for (index, chat) in archive.iter().enumerate().rev() {
        println!(
            "--- Chat {} ({}) ---",
            index + 1,
            chat.archived_at.format("%Y-%m-%d %H:%M UTC")
        );
        for message in &chat.messages {
            println!("{}: {}", message.role.label(), message.content);
        }
    }
}

/// Search archived chats for a substring and print the hits.
fn print_find(session: &ChatSession, term: &str) {
    let hits = session.search_archive(term);
    if hits.is_empty() {
        println!("No archived messages matching \"{term}\".");
        return;
    }
    for (index, messages) in hits {
        println!("--- Chat {} ---", index + 1);
        for message in messages {
            println!("{}: {}", message.role.label(), message.content);
        }
    }
}

/// Run the interactive loop until `/quit` or end of input.
async fn repl(
    orchestrator: &ChatOrchestrator<GoogleSearchClient, GeminiClient>,
    session: &mut ChatSession,
) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Websage ready. Type a question, `{SEARCH_PREFIX} <query>` for raw results, or /quit.");
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            "/quit" | "/exit" => break,
            "/new" => {
                session.archive_and_reset();
                println!("Started a new chat.");
            }
            "/history" => print_history(session),
            _ if input == "/find" => {
                println!("Usage: /find <text>");
            }
            _ if input.starts_with("/find ") => {
                print_find(session, input["/find ".len()..].trim());
            }
            _ => {
                let mut printed = String::new();
                let reply = orchestrator
                    .handle_input(session, input, |partial| {
                        render_partial(partial, &mut printed);
                    })
                    .await;
                if printed.is_empty() {
                    // Raw-search replies arrive whole, not streamed.
                    println!("{reply}");
                } else {
                    println!();
                }
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Credentials may live in a local .env file.
    let _ = dotenvy::dotenv();

    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let config = WebsageConfig::load_or_default(&config_file);

    // Tracing.
    let log_level = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    tracing::info!("Starting Websage v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration resolved");

    // Credentials. All three must be present before anything runs.
    let credentials = match Credentials::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "Startup aborted");
            eprintln!("websage: {e}");
            eprintln!(
                "Set {}, {}, and {} (a .env file in the working directory also works).",
                Credentials::MODEL_KEY_VAR,
                Credentials::SEARCH_KEY_VAR,
                Credentials::ENGINE_ID_VAR,
            );
            return Err(e.into());
        }
    };

    // Search and model clients.
    let search = GoogleSearchClient::new(
        &config.search.endpoint,
        &credentials.search_api_key,
        &credentials.search_engine_id,
    );
    let model = GeminiClient::new(&config.model.endpoint, &credentials.model_api_key);
    let generator = AnswerGenerator::new(model, config.model.variants.clone())
        .with_rate_limit_delay(Duration::from_secs(config.model.rate_limit_delay_secs));
    let orchestrator = ChatOrchestrator::new(search, generator);
    tracing::info!(variants = ?config.model.variants, "Chat orchestrator ready");

    let mut session = ChatSession::new();
    repl(&orchestrator, &mut session).await?;

    tracing::info!("Websage exiting");
    Ok(())
}
