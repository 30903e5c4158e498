//! `ahl` command line: registry editing and fixture scans

use ahl_core::{EngineConfig, HighlightEngine, ScanReport};
use ahl_host::{DocumentSpec, JsonFileStore, SharedDocument, SyncStore};
use ahl_registry::{save_address_list, AddressSet};
use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn store_arg() -> Arg {
    Arg::new("store")
        .long("store")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("JSON file backing the synchronized store")
}

fn config_arg() -> Arg {
    Arg::new("config")
        .long("config")
        .value_parser(value_parser!(PathBuf))
        .help("TOML engine configuration")
}

fn cli() -> Command {
    Command::new("ahl")
        .version(ahl_core::VERSION)
        .about("Address highlighter: maintain the registry and scan document fixtures")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("save")
                .about("Replace the registered address list")
                .arg(store_arg())
                .arg(config_arg())
                .arg(
                    Arg::new("addresses")
                        .required(true)
                        .num_args(1..)
                        .help("Addresses separated by commas, '、' or whitespace"),
                ),
        )
        .subcommand(
            Command::new("show")
                .about("Print the registered address list")
                .arg(store_arg())
                .arg(config_arg()),
        )
        .subcommand(
            Command::new("scan")
                .about("Harvest and highlight a document fixture")
                .arg(store_arg())
                .arg(config_arg())
                .arg(
                    Arg::new("document")
                        .long("document")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Document fixture (.json, .yaml or .yml)"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
}

async fn load_config(args: &ArgMatches) -> anyhow::Result<EngineConfig> {
    match args.get_one::<PathBuf>("config") {
        Some(path) => EngineConfig::load(path)
            .await
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(EngineConfig::new()),
    }
}

fn open_store(args: &ArgMatches, config: &EngineConfig) -> anyhow::Result<JsonFileStore> {
    let path = args
        .get_one::<PathBuf>("store")
        .context("--store is required")?;
    Ok(JsonFileStore::new(path.clone(), config.storage_area))
}

async fn save(args: &ArgMatches) -> anyhow::Result<()> {
    let config = load_config(args).await?;
    let store = open_store(args, &config)?;
    let raw = args
        .get_many::<String>("addresses")
        .map(|values| values.cloned().collect::<Vec<_>>().join(" "))
        .unwrap_or_default();

    let saved = save_address_list(&store, &config.storage_key, &raw).await?;
    println!("Saved {} address(es)", saved.len());
    Ok(())
}

async fn show(args: &ArgMatches) -> anyhow::Result<()> {
    let config = load_config(args).await?;
    let store = open_store(args, &config)?;
    let raw = store.get(&config.storage_key, Vec::new()).await?;
    for address in AddressSet::from_raw(&raw).iter() {
        println!("{address}");
    }
    Ok(())
}

async fn scan(args: &ArgMatches) -> anyhow::Result<()> {
    let config = load_config(args).await?;
    let store = open_store(args, &config)?;
    let fixture = args
        .get_one::<PathBuf>("document")
        .context("--document is required")?;
    let document = DocumentSpec::load(fixture)
        .await
        .with_context(|| format!("loading document {}", fixture.display()))?
        .to_document()?;

    let engine = HighlightEngine::new(config, SharedDocument::new(document), Arc::new(store))?;
    if let Err(e) = engine.load_registry().await {
        tracing::error!("Failed to load registered addresses: {}", e);
    }
    let outcome = engine.harvest_now().await?;
    engine.highlight_now();

    let report = ScanReport::collect(&engine, &outcome);
    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.generate_text());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();
    match matches.subcommand() {
        Some(("save", args)) => save(args).await,
        Some(("show", args)) => show(args).await,
        Some(("scan", args)) => scan(args).await,
        _ => unreachable!("subcommand_required"),
    }
}
