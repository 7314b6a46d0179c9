use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::{error, info};

use shnoor_chat::{chat, constants, web_server, ChatConfig, MessageResolver};

// Define the command-line interface structure using clap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Gemini API key (defaults to GEMINI_API_KEY / VITE_GEMINI_API_KEY).
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Gemini model name.
    #[arg(long, global = true)]
    model: Option<String>,

    /// Base URL of the generative language API.
    #[arg(long, global = true)]
    api_base_url: Option<String>,

    /// Company the assistant answers for.
    #[arg(long, global = true)]
    company: Option<String>,
}

// Define the available subcommands
#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Start the chat web server.
    Start {
        #[arg(long, default_value_t = constants::DEFAULT_PORT, help = "Port for the web server.")]
        port: u16,
    },
    /// Chat with the assistant in the terminal.
    Chat,
    /// Ask a single question and print the answer.
    Ask {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
}

impl Cli {
    // Environment first, then any flags given on the command line
    fn config(&self) -> ChatConfig {
        let mut config = ChatConfig::from_env();
        if let Some(key) = &self.api_key {
            config = config.with_api_key(key.clone());
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(url) = &self.api_base_url {
            config.api_base_url = url.clone();
        }
        if let Some(company) = &self.company {
            config.company = company.clone();
        }
        config
    }
}

// The main entry point of the application, using tokio's async runtime
#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (for GEMINI_API_KEY and friends)
    dotenvy::dotenv().ok();

    // Initialize tracing (logging) subscriber, reading RUST_LOG.
    // Logs go to stderr so `ask` and `chat` output stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Parse command-line arguments
    let cli = Cli::parse();
    info!("shnoor-chat starting with command: {:?}", cli.command);

    let config = cli.config();
    if config.api_key().is_none() {
        info!("No Gemini API key configured; unmatched questions will get the connection-error reply");
    }
    let resolver = Arc::new(MessageResolver::from_config(&config));

    // Handle the parsed command
    match cli.command {
        Commands::Start { port } => {
            info!("Starting web server on port {}...", port);
            // Run the web server in its own task
            let mut web_server_handle = tokio::spawn(web_server::start_web_server(
                port,
                resolver.clone(),
                config.greeting(),
            ));

            // Keep running until Ctrl-C or the server task ends
            let ctrl_c = tokio::signal::ctrl_c();
            // Pin the ctrl_c future to the stack so its address is stable
            tokio::pin!(ctrl_c);

            tokio::select! {
                _ = &mut ctrl_c => {
                    info!("Ctrl-C received, initiating shutdown...");
                }
                res = &mut web_server_handle => {
                    match res {
                        Ok(Ok(())) => info!("Web server task completed unexpectedly."),
                        Ok(Err(e)) => {
                            error!("Web server failed: {:?}", e);
                            return Err(e);
                        }
                        Err(e) if e.is_panic() => error!("Web server task panicked: {:?}", e),
                        Err(e) => error!("Web server task failed: {:?}", e),
                    }
                }
            }

            if !web_server_handle.is_finished() {
                info!("Aborting web server task...");
                web_server_handle.abort();
            }
            info!("Shutdown complete.");
        }
        Commands::Chat => {
            let stdin = BufReader::new(tokio::io::stdin());
            let mut stdout = tokio::io::stdout();
            chat::run_chat(resolver, config.greeting(), stdin, &mut stdout)
                .await
                .context("Chat session failed")?;
        }
        Commands::Ask { question } => {
            // Words arrive as separate args when the question is unquoted
            let question = question.join(" ");
            match resolver.resolve(&question, &Default::default()).await {
                Some(reply) => println!("{}", reply.text),
                None => anyhow::bail!("Question must not be blank"),
            }
        }
    }

    Ok(())
}
