mod doctor;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand};
use futures::StreamExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

use partsbot_agent::graph::{build_finder, ConversationGraph};
use partsbot_catalog::{CatalogClient, SearchParams};
use partsbot_core::config::AppConfig;
use partsbot_core::types::{ChatMessage, SessionId};
use partsbot_dialogue::{DialogueClient, SseStream};
use partsbot_gateway::{AppState, GatewayServer};

#[derive(Parser)]
#[command(name = "partsbot", version, about = "Truck-parts chatbot gateway")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "partsbot.toml", env = "PARTSBOT_CONFIG")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway (default)
    Serve,
    /// Show the resolved configuration
    Config,
    /// Check connectivity to the dialogue backend and the parts catalog
    Doctor,
    /// Send a message to the dialogue backend
    Send {
        /// Stream the reply as it is generated
        #[arg(long)]
        stream: bool,
        /// Session ID (auto-generated if not provided)
        #[arg(short, long)]
        session: Option<String>,
        /// The message text
        #[arg(trailing_var_arg = true, required = true)]
        message: Vec<String>,
    },
    /// Run a message through the local conversation graph
    Assist {
        /// The message text
        #[arg(trailing_var_arg = true, required = true)]
        message: Vec<String>,
    },
    /// Search the parts catalog
    Search {
        #[arg(long)]
        make: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        year: Option<String>,
        #[arg(long)]
        part_type: Option<String>,
        /// Free-text keyword
        #[arg(long)]
        keyword: Option<String>,
        /// Maximum results
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show catalog details for one part number
    Part {
        part_number: String,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("partsbot=info,warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    // Handle completions before config loading
    if let Some(Commands::Completions { shell }) = &cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(*shell, &mut cmd, "partsbot", &mut std::io::stdout());
        return Ok(());
    }

    let config = AppConfig::resolve(&cli.config)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let state = Arc::new(AppState::from_config(config)?);
            info!(
                bind = %state.config.gateway.bind,
                finder = state.graph.finder_name(),
                "Starting gateway"
            );
            let server = GatewayServer::new(state);
            let cancel = tokio_util::sync::CancellationToken::new();
            let cancel_clone = cancel.clone();

            // Graceful shutdown on Ctrl-C
            tokio::spawn(async move {
                tokio::signal::ctrl_c().await.ok();
                info!("Shutting down gateway...");
                cancel_clone.cancel();
            });

            server.run(cancel).await?;
        }
        Commands::Config => {
            println!("{}", toml::to_string_pretty(&redacted(config))?);
        }
        Commands::Doctor => {
            doctor::run_doctor(&config).await;
        }
        Commands::Send {
            stream,
            session,
            message,
        } => {
            let client = DialogueClient::new(&config.dialogue)?;
            let session = session
                .map(|s| SessionId::from_string(&s))
                .unwrap_or_default();
            let messages = vec![ChatMessage::user(message.join(" "))];
            let request_config = Some(client.request_config().clone());

            if stream {
                let response = client
                    .send_message_stream(&messages, Some(&session), request_config)
                    .await?;
                let mut events = SseStream::new(response.bytes_stream());
                let mut stdout = std::io::stdout();
                while let Some(event) = events.next().await {
                    if event.is_error() {
                        eprintln!("\n[error] {}", event.content().unwrap_or_default());
                        continue;
                    }
                    if let Some(text) = event.content() {
                        print!("{}", text);
                        stdout.flush().ok();
                    }
                }
                println!();
            } else {
                let reply = client
                    .get_chat_response(&messages, Some(&session), request_config)
                    .await?;
                println!("{}", reply.message);
                for call in reply.tool_calls.unwrap_or_default() {
                    eprintln!("  [tool] {} {}", call.tool, serde_json::to_string(&call.args)?);
                }
            }
            eprintln!("session: {}", session);
        }
        Commands::Assist { message } => {
            let catalog = Arc::new(CatalogClient::new(&config.catalog)?);
            let graph = ConversationGraph::new(build_finder(&config, Some(catalog)));
            let state = graph
                .process_messages(vec![ChatMessage::user(message.join(" "))])
                .await;
            match state.messages.last() {
                Some(reply) if reply.role == partsbot_core::types::Role::Assistant => {
                    println!("{}", reply.content)
                }
                _ => println!("(no reply)"),
            }
        }
        Commands::Search {
            make,
            model,
            year,
            part_type,
            keyword,
            limit,
        } => {
            let client = CatalogClient::new(&config.catalog)?;
            let params = SearchParams {
                make,
                model,
                year,
                part_type,
                keyword,
                limit,
                ..Default::default()
            };
            let outcome = client.search_summary(&params).await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Part { part_number } => {
            let client = CatalogClient::new(&config.catalog)?;
            let outcome = client.part_details_summary(&part_number).await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Completions { .. } => unreachable!("handled before config loading"),
    }

    Ok(())
}

/// Copy of the config safe to print: keys are masked.
fn redacted(mut config: AppConfig) -> AppConfig {
    let mask = |key: &mut Option<String>| {
        if key.is_some() {
            *key = Some("********".into());
        }
    };
    mask(&mut config.dialogue.api_key);
    mask(&mut config.catalog.api_key);
    config
}
