mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "dalal")]
#[command(about = "Indian stock market assistant backed by live NSE/BSE data", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default configuration to ~/.dalal
    Onboard {
        /// Force overwrite existing configuration
        #[arg(long)]
        force: bool,
    },

    /// Start the REST API
    Serve {
        /// Port to listen on (overrides config gateway.port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides config gateway.host)
        #[arg(long)]
        host: Option<String>,
    },

    /// Ask a question (interactive mode if no message is given)
    Ask {
        /// Question to ask
        #[arg(short, long)]
        message: Option<String>,
    },

    /// List registered tools
    Tools {
        /// Show the parameter schema of one tool
        #[arg(long)]
        info: Option<String>,
    },

    /// Run a tool directly, bypassing the LLM
    Run {
        /// Tool name
        tool_name: String,
        /// JSON parameters (e.g. '{"symbol":"TCS"}')
        #[arg(default_value = "{}")]
        params: String,
    },

    /// Call one market-data endpoint and print the raw JSON
    Fetch {
        /// Endpoint path (e.g. stock, trending, historical_data)
        endpoint: String,
        /// Query parameters as key=value
        params: Vec<String>,
        /// Also save the response under this directory
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Save raw responses of every endpoint for a fixed sample set
    Snapshot {
        /// Output directory (defaults to ~/.dalal/api_responses)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Run environment diagnostics
    Doctor {
        /// Also call the market-data API once
        #[arg(long)]
        ping: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup tracing
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    dotenv::dotenv().ok();

    match cli.command {
        Commands::Onboard { force } => {
            commands::onboard::run(force).await?;
        }
        Commands::Serve { port, host } => {
            commands::serve::run(host, port).await?;
        }
        Commands::Ask { message } => {
            commands::ask::run(message).await?;
        }
        Commands::Tools { info } => match info {
            Some(name) => commands::tools_cmd::info(&name).await?,
            None => commands::tools_cmd::list().await?,
        },
        Commands::Run { tool_name, params } => {
            commands::run_cmd::tool(&tool_name, &params).await?;
        }
        Commands::Fetch {
            endpoint,
            params,
            save,
        } => {
            commands::fetch_cmd::run(&endpoint, &params, save).await?;
        }
        Commands::Snapshot { out } => {
            commands::snapshot::run(out).await?;
        }
        Commands::Doctor { ping } => {
            commands::doctor::run(ping).await?;
        }
    }

    Ok(())
}
