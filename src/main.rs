use anyhow::Result;
use clap::{Parser, Subcommand};

mod cli;

/// folio - portfolio contact transmission service
#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Delivers portfolio contact submissions as email", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Server host address (overrides config file)
        #[arg(long)]
        host: Option<String>,

        /// Server port (overrides config file)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Open the contact prompt in this terminal
    Contact {
        /// Send endpoint to transmit to
        #[arg(long, default_value = "http://127.0.0.1:3000/api/send")]
        endpoint: String,

        /// Prompt sequence to run
        #[arg(long, value_enum, default_value = "terminal")]
        variant: cli::contact::Flow,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = folio::Config::load(cli.config.clone())?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    folio::observability::init_observability(
        "folio",
        env!("CARGO_PKG_VERSION"),
        &config.observability.log_level,
    )?;

    match cli.command {
        Commands::Serve { host, port } => cli::server::serve(config, host, port).await,
        Commands::Contact { endpoint, variant } => cli::contact::run(endpoint, variant).await,
    }
}
