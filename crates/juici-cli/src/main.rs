use anyhow::Result;
use clap::{Parser, Subcommand};
use juici::config::{BaseUrlSources, ClientConfig};
use juici::models::agent::AgentIdentity;
use juici::transport::{ChatClient, TurnOutcome};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod prompt;

use commands::chat::ChatSession;
use prompt::rustyline::RustylinePrompt;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Origin of the chat service, used when JUICI_DEPLOYMENT_URL and JUICI_API_URL are unset
    #[arg(long, global = true)]
    origin: Option<String>,

    /// Always ask for complete replies instead of streamed ones
    #[arg(long, global = true)]
    no_stream: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the available agents, or describe one
    Agents {
        /// Agent to describe
        id: Option<AgentIdentity>,
    },

    /// Chat with an agent
    Chat {
        /// Agent to talk to
        #[arg(short, long)]
        agent: AgentIdentity,

        /// Send a single message and exit instead of starting an interactive session
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Upload an image for analysis
    Upload {
        /// Agent that analyzes the image
        #[arg(short, long)]
        agent: AgentIdentity,

        /// Image file to upload
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut sources = BaseUrlSources::from_env();
    if let Some(origin) = cli.origin {
        sources = sources.with_origin(origin);
    }
    let config = ClientConfig::from_sources(&sources).with_streaming(!cli.no_stream);
    tracing::debug!(base_url = %config.base_url, "resolved chat service");
    let client = ChatClient::new(config)?;

    match cli.command {
        Command::Agents { id: None } => commands::agents::list(&client).await?,
        Command::Agents { id: Some(id) } => commands::agents::show(&client, &id).await?,
        Command::Chat { agent, message } => {
            let prompt = Box::new(RustylinePrompt::new()?);
            let mut session = ChatSession::new(client, agent, prompt);
            match message {
                Some(message) => exit_on_failure(session.headless_start(&message).await?),
                None => session.start().await?,
            }
        }
        Command::Upload { agent, path } => {
            let mut prompt = RustylinePrompt::new()?;
            let outcome = commands::upload::run(&client, &agent, &path, &mut prompt).await?;
            exit_on_failure(outcome);
        }
    }
    Ok(())
}

/// One-shot commands report a failed turn through the exit status
fn exit_on_failure(outcome: TurnOutcome) {
    if !outcome.is_completed() {
        std::process::exit(1);
    }
}
