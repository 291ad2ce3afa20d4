mod app;
mod handler;
mod oneshot;
mod tui;
mod ui;
mod widgets;

use std::io;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use app::App;
use oneshot::{NoButton, PresetInput, PrintSink};
use triagem_core::{logging, ChatController, Config, ConfigFile, Overrides, TriageClient};

#[derive(Parser)]
#[command(name = "triagem")]
#[command(version, about = "Chat client for the TrIAgem symptom triage service")]
struct Cli {
    /// Triage endpoint URL (overrides TRIAGEM_API_URL and the config file)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Response schema spoken by the endpoint: v1 or v2
    #[arg(long, global = true)]
    schema: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Config file to read instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive triage chat (default)
    Chat,
    /// Submit one description of symptoms and print the exchange
    Ask {
        /// Symptoms; multiple words are joined with spaces
        #[arg(required = true)]
        text: Vec<String>,
        /// Print chat bubbles as HTML instead of text
        #[arg(long)]
        html: bool,
    },
    /// Check the gateway and its agents
    Health,
    /// Show the effective configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Chat);

    match &command {
        Commands::Chat => {
            let path = logging::default_log_path();
            logging::init_file(&path)
                .map_err(|e| anyhow!(e))
                .with_context(|| format!("could not open log file {}", path.display()))?;
        }
        _ => logging::init_stderr().map_err(|e| anyhow!(e))?,
    }

    let overrides = Overrides {
        endpoint: cli.endpoint,
        schema: cli.schema,
        timeout_secs: cli.timeout,
    };
    let config = Config::load(cli.config.as_deref(), &overrides)?;
    info!(endpoint = %config.endpoint, schema = %config.schema, "configuration loaded");

    match command {
        Commands::Chat => run_chat(&config).await?,
        Commands::Ask { text, html } => ask(&config, &text.join(" "), html).await?,
        Commands::Health => health(&config).await?,
        Commands::Config { save } => show_config(&config, cli.config, save)?,
    }

    Ok(())
}

async fn run_chat(config: &Config) -> Result<()> {
    let mut app = App::new(config)?;

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;

            match events.next().await {
                Some(event) => handler::handle_event(&mut app, event).await?,
                None => break,
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    if let Some(task) = app.pending.take() {
        task.abort();
    }
    tui::restore()?;
    result
}

async fn ask(config: &Config, text: &str, html: bool) -> Result<()> {
    let client = TriageClient::new(config)?;
    let mut controller = ChatController::new(
        PresetInput::new(text),
        NoButton,
        PrintSink::new(io::stdout(), html),
        client,
    );

    // Triage failures are printed as chat messages, like in the interactive UI
    controller.submit().await;
    Ok(())
}

async fn health(config: &Config) -> Result<()> {
    let client = TriageClient::new(config)?;
    let status = client
        .health()
        .await
        .with_context(|| format!("health check against {} failed", config.health_url()))?;

    let rows = [
        ("gateway", &status.gateway),
        ("agente de triagem", &status.triage_agent),
        ("agente de recomendações", &status.recommendations_agent),
        ("timestamp", &status.timestamp),
    ];
    for (name, value) in rows {
        println!("{:<25}{}", format!("{}:", name), value);
    }

    if !status.all_healthy() {
        return Err(anyhow!("one or more services are not healthy"));
    }
    Ok(())
}

fn show_config(config: &Config, path: Option<PathBuf>, save: bool) -> Result<()> {
    println!("endpoint: {}", config.endpoint);
    println!("schema:   {}", config.schema);
    println!("timeout:  {}s", config.timeout.as_secs());

    if save {
        let path = match path {
            Some(path) => path,
            None => Config::default_path()?,
        };
        let file: ConfigFile = config.to_file();
        file.save(&path)?;
        println!("saved to {}", path.display());
    }
    Ok(())
}
