use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    config::AppConfig,
    http::{router, AppState},
    services::extract,
    store::SqliteStore,
    types::{ExtractionResult, HotelQuery, HotelSearchResult},
    HotelFinder, TravelAssistant,
};

const DEFAULT_LOG_FILTER: &str = "info,travel=debug";

fn command() -> Command {
    Command::new("travel-assistant")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Travel planning assistant that turns model replies into actionable trip tasks")
        .subcommand_required(true)
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .value_name("MODEL")
                .global(true)
                .help("Gemini model to use (or set GEMINI_MODEL)"),
        )
        .arg(
            Arg::new("api-key")
                .short('k')
                .long("api-key")
                .value_name("KEY")
                .global(true)
                .help("Gemini API key (or set GEMINI_API_KEY)"),
        )
        .arg(
            Arg::new("base-url")
                .short('u')
                .long("base-url")
                .value_name("URL")
                .global(true)
                .help("Gemini API base URL (or set GEMINI_BASE_URL)"),
        )
        .arg(
            Arg::new("timeout")
                .short('t')
                .long("timeout")
                .value_name("SECONDS")
                .global(true)
                .value_parser(clap::value_parser!(u64))
                .help("Model request timeout in seconds"),
        )
        .subcommand(
            Command::new("serve")
                .about("Run the HTTP API")
                .arg(
                    Arg::new("bind")
                        .short('b')
                        .long("bind")
                        .value_name("ADDR")
                        .help("Address to listen on (or set TRAVEL_BIND_ADDR)"),
                )
                .arg(
                    Arg::new("database")
                        .short('d')
                        .long("database")
                        .value_name("PATH")
                        .help("SQLite database file (or set TRAVEL_DATABASE_PATH)"),
                ),
        )
        .subcommand(
            Command::new("ask")
                .about("Ask the assistant a single question")
                .arg(
                    Arg::new("query")
                        .help("The travel question")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the result as JSON"),
                ),
        )
        .subcommand(
            Command::new("hotels")
                .about("List the best rated hotels for a destination")
                .arg(
                    Arg::new("destination")
                        .help("City to search")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("limit")
                        .short('l')
                        .long("limit")
                        .value_name("N")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("12")
                        .help("Maximum number of hotels to show"),
                )
                .arg(
                    Arg::new("currency")
                        .short('c')
                        .long("currency")
                        .value_name("CODE")
                        .default_value("USD")
                        .help("Currency for prices"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the result as JSON"),
                ),
        )
        .subcommand(
            Command::new("extract")
                .about("Split a saved model reply into narrative and tasks, offline")
                .arg(
                    Arg::new("query")
                        .short('q')
                        .long("query")
                        .value_name("TEXT")
                        .default_value("")
                        .help("The user question the reply answered; drives fallbacks"),
                )
                .arg(
                    Arg::new("file")
                        .value_name("FILE")
                        .index(1)
                        .help("File holding the raw reply; reads stdin when omitted"),
                ),
        )
}

/// CLI entry point for the travel assistant
pub async fn run() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = command().get_matches();
    let mut config = AppConfig::from_env()?;

    match matches.subcommand() {
        Some(("serve", sub)) => {
            apply_overrides(&mut config, sub);
            if let Some(bind) = sub.get_one::<String>("bind") {
                config.bind_addr = bind.clone();
            }
            if let Some(database) = sub.get_one::<String>("database") {
                config.database_path = database.into();
            }
            serve(config).await
        }
        Some(("ask", sub)) => {
            apply_overrides(&mut config, sub);
            let query = sub
                .get_one::<String>("query")
                .context("a query is required")?;
            ask(config, query, sub.get_flag("json")).await
        }
        Some(("hotels", sub)) => {
            let destination = sub
                .get_one::<String>("destination")
                .context("a destination is required")?;
            let query = HotelQuery::new(destination.as_str()).with_currency(
                sub.get_one::<String>("currency")
                    .map(String::as_str)
                    .unwrap_or("USD"),
            );
            let limit = sub.get_one::<usize>("limit").copied().unwrap_or(12);
            hotels(&config, &query, limit, sub.get_flag("json")).await
        }
        Some(("extract", sub)) => {
            let query = sub
                .get_one::<String>("query")
                .map(String::as_str)
                .unwrap_or_default();
            let file = sub.get_one::<String>("file").map(Path::new);
            extract_offline(query, file)
        }
        _ => anyhow::bail!("unknown command; see --help"),
    }
}

fn apply_overrides(config: &mut AppConfig, matches: &ArgMatches) {
    if let Some(model) = matches.get_one::<String>("model") {
        config.gemini_model = model.clone();
    }
    if let Some(key) = matches.get_one::<String>("api-key") {
        config.gemini_api_key = key.clone();
    }
    if let Some(url) = matches.get_one::<String>("base-url") {
        config.gemini_base_url = url.clone();
    }
    if let Some(secs) = matches.get_one::<u64>("timeout") {
        config.request_timeout = Duration::from_secs(*secs);
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    config.validate()?;

    let store = Arc::new(SqliteStore::open(&config.database_path)?);
    let state = AppState::new(TravelAssistant::from_config(&config), store)
        .with_hotels(HotelFinder::from_config(&config))
        .with_identity(Arc::new(config.identity()?))
        .with_default_user(config.default_user.clone());

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(
        target: "travel::http",
        %addr,
        model = %config.gemini_model,
        database = %config.database_path.display(),
        "travel assistant listening"
    );
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn ask(config: AppConfig, query: &str, as_json: bool) -> anyhow::Result<()> {
    config.validate()?;

    let assistant = TravelAssistant::from_config(&config);
    info!(target: "travel::model", model = assistant.model_name(), "asking: {}", query);

    let result = assistant.ask(query).await;
    print_result(&result, as_json)
}

async fn hotels(
    config: &AppConfig,
    query: &HotelQuery,
    limit: usize,
    as_json: bool,
) -> anyhow::Result<()> {
    let finder = HotelFinder::from_config(config);
    let result = finder.best_deals(query, limit).await;
    print_hotels(&result, as_json)
}

fn print_hotels(result: &HotelSearchResult, as_json: bool) -> anyhow::Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(&result.hotels)?);
        return Ok(());
    }

    println!("\n{} ({})", result.data_source, result.hotels.len());
    if let Some(message) = &result.message {
        println!("{message}");
    }
    for hotel in &result.hotels {
        println!(
            "  - {} [{:.1}] {:.0} {}/night",
            hotel.name, hotel.rating, hotel.price, hotel.currency
        );
        println!("      {}", hotel.location);
    }
    Ok(())
}

fn extract_offline(query: &str, file: Option<&Path>) -> anyhow::Result<()> {
    let raw = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("failed to read reply from stdin")?;
            raw
        }
    };

    print_result(&extract(&raw, query), true)
}

fn print_result(result: &ExtractionResult, as_json: bool) -> anyhow::Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    println!("\n{}\n", result.narrative);
    println!("Suggested tasks:");
    for task in &result.tasks {
        let due = task.suggested_due_date.as_deref().unwrap_or("no due date");
        println!(
            "  - [{}/{}] {} ({})",
            task.category, task.priority, task.title, due
        );
        if !task.description.is_empty() {
            println!("      {}", task.description);
        }
    }
    Ok(())
}
