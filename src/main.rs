mod ask;
mod cli;
mod config;
mod llm;
mod markdown;
mod prompt;
mod rag;
mod search;
mod server;

pub const USER_AGENT: &str = concat!("web-rag/", env!("CARGO_PKG_VERSION"));

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use reqwest::Client;
use tracing::info;

use cli::{AskArgs, Cli, Command, ServeArgs};
use config::Config;
use llm::ChatClient;
use rag::Rag;
use search::DuckDuckGoClient;
use server::AppState;

/// TCP connection establishment timeout for outbound calls.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_REDIRECTS: usize = 5;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is fine; a malformed one is not.
    if let Err(e) = dotenvy::dotenv()
        && !e.not_found()
    {
        return Err(e.into());
    }

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("web_rag=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Command::Ask(args)) => run_ask(args).await,
        None => run_server(cli.serve).await,
    }
}

async fn run_server(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()
        .inspect_err(|e| tracing::error!("refusing to start: {e}"))?;
    info!(
        provider = %config.llm.provider,
        base_url = %config.llm.base_url,
        "starting web-rag API"
    );

    let http = Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(CONNECT_TIMEOUT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .build()?;

    let rag = Rag::new(
        DuckDuckGoClient::new(http.clone(), &config.search_base_url),
        ChatClient::new(http, &config.llm),
        config.llm.clone(),
    );

    server::serve(args.addr(), Arc::new(AppState { rag })).await?;
    Ok(())
}

async fn run_ask(args: AskArgs) -> Result<(), Box<dyn std::error::Error>> {
    let http = Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()?;

    let response = ask::ask(&http, &args.api_url, &args.question(), args.model.clone()).await?;
    println!("{}", ask::format_answer(&response));
    Ok(())
}
