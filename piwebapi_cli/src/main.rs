mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use piwebapi::{CrawlRetry, ErrorPolicy, Executor, HttpSession, SessionConfig, WebApi};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "piwebapi")]
#[command(about = "Read and write PI Web API stream data")]
struct Cli {
    /// PI Web API root URL (e.g. https://pisrv01/piwebapi)
    #[arg(long, env = "PIWEBAPI_URL", global = true)]
    url: Option<String>,

    /// Username for basic authentication
    #[arg(long, env = "PIWEBAPI_USERNAME", global = true)]
    username: Option<String>,

    /// Password for basic authentication
    #[arg(long, env = "PIWEBAPI_PASSWORD", global = true, hide_env_values = true)]
    password: Option<String>,

    /// Accept self-signed server certificates
    #[arg(long, global = true)]
    insecure: bool,

    /// What to do when the server reports an error: stop or continue
    #[arg(long, default_value = "stop", global = true)]
    error_action: ErrorPolicy,

    /// Output format: json or table
    #[arg(long, default_value = "json", global = true)]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the server's root document
    Info,
    /// GET a resource relative to the root URL
    Get(commands::request::RequestArgs),
    /// PUT a resource relative to the root URL
    Put(commands::request::RequestArgs),
    /// POST a JSON body to a resource relative to the root URL
    Post(commands::request::PostArgs),
    /// Run one stream action for several points through the batch endpoint
    Batch(commands::batch::BatchArgs),
}

fn session_config(cli: &Cli) -> SessionConfig {
    let config = match (&cli.username, &cli.password) {
        (Some(username), Some(password)) => SessionConfig::basic(username, password),
        (Some(username), None) => SessionConfig::basic(username, ""),
        _ => SessionConfig::default(),
    };
    config.with_verify_tls(!cli.insecure)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("piwebapi=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let format = match cli.output.as_str() {
        "table" => OutputFormat::Table,
        _ => OutputFormat::Json,
    };

    let url = cli
        .url
        .as_deref()
        .context("no server given: pass --url or set PIWEBAPI_URL")?;
    let session = HttpSession::new(session_config(&cli))?;
    let executor = Executor::new().with_retry(CrawlRetry::from_env());
    let api = WebApi::connect_with(url, session, executor, cli.error_action).await?;

    match &cli.command {
        Commands::Info => commands::info::run(&api, &format),
        Commands::Get(args) => commands::request::get(args, &api, cli.error_action).await?,
        Commands::Put(args) => commands::request::put(args, &api, cli.error_action).await?,
        Commands::Post(args) => commands::request::post(args, &api, cli.error_action).await?,
        Commands::Batch(args) => commands::batch::run(args, &api, &format).await?,
    }

    Ok(())
}
