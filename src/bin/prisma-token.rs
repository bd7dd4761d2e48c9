use anyhow::Result;
use clap::{Parser, Subcommand};
use prisma_token::config::loader;
use prisma_token::observability::metrics;
use prisma_token::utils::logging::{self, LogLevel};
use prisma_token::{Provider, TokenProvider};
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "prisma-token.yaml")]
    config: String,
    /// Overrides `api` from the config file
    #[arg(long, env = "API")]
    api: Option<String>,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    /// Print the metrics exposition to stderr before exiting
    #[arg(long)]
    metrics: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Print the bearer token (default)
    Token,
    /// Print the cloud account ID carried by the issued token
    AccountId,
    /// Print a ready-to-use Authorization header value
    Authorization,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config, apply command line overrides
    // -------------------------------

    let args = Args::parse();
    let service_config = loader::run(&args.config, args.api.as_deref()).await?;
    logging::run(&service_config.settings, args.log_level);

    // -------------------------------
    // 2. Build shared transport and provider
    // -------------------------------

    let client = loader::build_http_client(&service_config.settings)?;
    let provider = Provider::from_config(service_config.api.as_deref(), &service_config.provider, &client)?;
    info!(provider = service_config.provider.type_name(), "provider ready");

    // -------------------------------
    // 3. Run the requested operation
    // -------------------------------

    let output = match args.command.unwrap_or(Command::Token) {
        Command::Token => provider.token().await?,
        Command::AccountId => provider.account_id().await?,
        Command::Authorization => provider.authorization().await?,
    };
    println!("{}", output);

    if args.metrics || service_config.settings.metrics.is_enabled {
        eprintln!("{}", metrics::render().await?);
    }

    Ok(())
}
