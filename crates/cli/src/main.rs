mod config;
mod error;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use codelist::CodelistCache;
use mcp::{Server, ServerInfo};
use query::{Collection, QueryArgs, compile};
use runtime::{Datastore, DatastoreClient, HttpCodelistSource, IatiTools, http};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;
use error::Result;

const SERVER_NAME: &str = "iati-mcp";
const INSTRUCTIONS: &str = "Search the IATI Datastore for aid activities, transactions and budgets. \
     Use interpret_query to turn a question into country, status and sector filters, \
     then pass them to get_iati_projects, search_transactions or search_budgets. \
     get_codelist returns any published IATI codelist.";

type Tools = IatiTools<HttpCodelistSource, DatastoreClient>;

#[derive(Parser)]
#[command(name = "iati-mcp")]
#[command(about = "MCP server for searching the IATI Datastore", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the config file (default: ./iati-mcp.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve MCP over stdio
    Serve,
    /// Resolve country, status and sector terms in a question
    Interpret {
        /// The question to interpret
        question: String,
    },
    /// Compile a Datastore query, optionally executing it
    Query(QueryCommand),
    /// Fetch a published codelist
    Codelist {
        /// Codelist name, e.g. Sector
        name: String,
    },
}

#[derive(Args)]
struct QueryCommand {
    /// Target collection (activity, transaction, budget)
    collection: Collection,
    #[arg(long)]
    keyword: Option<String>,
    #[arg(long = "country")]
    country_code: Option<String>,
    #[arg(long = "status")]
    activity_status_code: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    min_value: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    max_value: Option<f64>,
    #[arg(long)]
    start_date: Option<NaiveDate>,
    #[arg(long)]
    end_date: Option<NaiveDate>,
    #[arg(long)]
    rows: Option<u32>,
    #[arg(long)]
    start: Option<u32>,
    #[arg(long)]
    facet_field: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    facet_limit: Option<i64>,
    /// Run the query and print the Datastore response
    #[arg(long)]
    execute: bool,
}

impl From<&QueryCommand> for QueryArgs {
    fn from(cmd: &QueryCommand) -> Self {
        QueryArgs {
            keyword: cmd.keyword.clone(),
            country_code: cmd.country_code.clone(),
            min_value: cmd.min_value,
            max_value: cmd.max_value,
            start_date: cmd.start_date,
            end_date: cmd.end_date,
            activity_status_code: cmd.activity_status_code.clone(),
            rows: cmd.rows,
            start: cmd.start,
            facet_field: cmd.facet_field.clone(),
            facet_limit: cmd.facet_limit,
        }
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Logs go to stderr; stdout carries the protocol.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::resolve(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::Serve) | None => cmd_serve(&config).await,
        Some(Commands::Interpret { question }) => cmd_interpret(&config, &question).await,
        Some(Commands::Query(cmd)) => cmd_query(&config, &cmd).await,
        Some(Commands::Codelist { name }) => cmd_codelist(&config, &name).await,
    }
}

fn build_tools(config: &Config) -> Result<(Arc<CodelistCache<HttpCodelistSource>>, Tools)> {
    let client = http::client(config.timeout())?;
    let source = HttpCodelistSource::new(client.clone(), &config.codelists.base_url);
    let datastore = DatastoreClient::new(client, &config.datastore.base_url);
    let cache = Arc::new(CodelistCache::new(source).with_ttl(config.ttl()));
    let tools = IatiTools::new(Arc::clone(&cache), datastore);
    Ok((cache, tools))
}

async fn cmd_serve(config: &Config) -> Result<()> {
    let (cache, tools) = build_tools(config)?;

    // Warm the codelists without delaying the handshake.
    tokio::spawn(async move {
        cache.ensure_all_fresh().await;
    });

    let info = ServerInfo {
        name: SERVER_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    info!(
        datastore = %config.datastore.base_url,
        codelists = %config.codelists.base_url,
        "serving MCP on stdio"
    );
    Server::new(info, tools)
        .with_instructions(INSTRUCTIONS)
        .serve_stdio()
        .await?;
    Ok(())
}

async fn cmd_interpret(config: &Config, question: &str) -> Result<()> {
    let (_, tools) = build_tools(config)?;
    let terms = tools.resolver().interpret(question).await;
    println!("{}", serde_json::to_string_pretty(&terms)?);
    Ok(())
}

async fn cmd_query(config: &Config, cmd: &QueryCommand) -> Result<()> {
    let compiled = compile(&QueryArgs::from(cmd), cmd.collection);

    if !cmd.execute {
        println!("{}", serde_json::to_string_pretty(&compiled)?);
        return Ok(());
    }

    let client = http::client(config.timeout())?;
    let datastore = DatastoreClient::new(client, &config.datastore.base_url);
    let response = datastore.select(cmd.collection, &compiled).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

async fn cmd_codelist(config: &Config, name: &str) -> Result<()> {
    let client = http::client(config.timeout())?;
    let source = HttpCodelistSource::new(client, &config.codelists.base_url);
    let document = source.fetch_document(name).await?;
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}
