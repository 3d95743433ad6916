//! kodex - browse a comics catalog from the terminal.
//!
//! ```text
//! kodex list characters --filter spider --page 2
//! kodex random comics
//! kodex suggest characters Spid
//! kodex favorites toggle characters --skip 12
//! kodex favorites list
//! ```
//!
//! Configuration comes from `KODEX_*` environment variables, logging from
//! `RUST_LOG`.

use clap::{Parser, Subcommand};
use color_eyre::{
    eyre::{Result, eyre},
    install,
};
use std::{sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, fmt};

use kodex::prelude::*;
use kodex::sources::RestCatalog;

#[derive(Parser)]
#[command(name = "kodex")]
#[command(about = "Browse a comics and characters catalog")]
struct Cli {
    /// Catalog API base URL (overrides KODEX_API_BASE_URL)
    #[arg(long, global = true)]
    api: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List one page of a collection
    List {
        collection: Collection,
        #[arg(long)]
        filter: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Pick a random item
    Random { collection: Collection },
    /// Show autocomplete suggestions for a query
    Suggest { collection: Collection, query: String },
    /// Manage local favorites
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
}

#[derive(Subcommand)]
enum FavoritesAction {
    /// Print both favorites lists
    List,
    /// Add or remove the item found at an offset of a collection
    Toggle {
        collection: Collection,
        #[arg(long)]
        skip: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    install()?;
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(api) = cli.api {
        config.api_base_url = api;
    }
    let catalog = Arc::new(RestCatalog::from_config(&config)?);

    match cli.command {
        Command::List {
            collection,
            filter,
            page,
            limit,
        } => {
            let mut params =
                ListingParams::default().with_limit(limit.unwrap_or(config.default_page_size));
            if let Some(filter) = filter {
                params = params.with_filter(&filter);
            }
            list(catalog, collection, &params.with_page(page)).await
        }
        Command::Random { collection } => {
            let discovery = RandomDiscovery::new(catalog, collection)
                .with_threshold(config.full_batch_threshold);
            match discovery.discover().await {
                Discovery::Found(item) => print_item(&item),
                _ => println!("Nothing to discover right now, try again."),
            }
            Ok(())
        }
        Command::Suggest { collection, query } => {
            suggest(catalog, &config, collection, &query).await
        }
        Command::Favorites { action } => favorites(catalog, &config, action).await,
    }
}

async fn list(
    catalog: Arc<RestCatalog>,
    collection: Collection,
    params: &ListingParams,
) -> Result<()> {
    let listing = Listing::new(catalog, collection);
    match listing.load(params).await {
        Some(ListingOutcome::Loaded { page, bounds }) => {
            for item in &page.items {
                println!("{:>10}  {}", item.id, item.label);
            }
            println!("{}", bounds.summary());
            if let Some(next) = bounds.next_page() {
                println!(
                    "next: {}",
                    params.clone().with_page(next).to_query_string(collection)
                );
            }
        }
        Some(ListingOutcome::NoData { .. }) => println!("{}", collection.empty_message()),
        Some(ListingOutcome::Failed { message }) => return Err(eyre!(message)),
        None => {}
    }
    Ok(())
}

async fn suggest(
    catalog: Arc<RestCatalog>,
    config: &Config,
    collection: Collection,
    query: &str,
) -> Result<()> {
    let engine = SuggestionEngine::from_config(catalog, config);
    let mut updates = engine.subscribe();
    engine.on_query_change(query, collection);

    let state = tokio::time::timeout(
        config.debounce + config.request_timeout,
        updates.wait_for(|state| state.settled),
    )
    .await
    .map_err(|_| eyre!("timed out waiting for suggestions"))??
    .clone();
    for label in &state.labels {
        println!("{}", label);
    }
    Ok(())
}

async fn favorites(
    catalog: Arc<RestCatalog>,
    config: &Config,
    action: FavoritesAction,
) -> Result<()> {
    let store = FavoritesStore::new(FileStorage::new(&config.favorites_dir));

    match action {
        FavoritesAction::List => {
            for collection in Collection::ALL {
                println!("[{}]", collection);
                for record in store.load(collection.namespace()) {
                    println!("{:>10}  {}", record.id, record.label);
                }
            }
        }
        FavoritesAction::Toggle { collection, skip } => {
            let token = CancellationToken::new();
            let item = tokio::time::timeout(
                Duration::from_secs(30),
                catalog.fetch_one(collection, skip, &token),
            )
            .await??
            .ok_or_else(|| eyre!("no {} at offset {}", collection, skip))?;

            let namespace = collection.namespace();
            let list = store.toggle(namespace, &item);
            let state = if store.contains(namespace, &item.id) {
                "added"
            } else {
                "removed"
            };
            println!("{} {} ({} favorites)", state, item.label, list.len());
        }
    }
    Ok(())
}

fn print_item(item: &CatalogItem) {
    println!("{}  {}", item.id, item.label);
    if let Some(thumbnail) = item.thumbnail.as_ref().filter(|t| t.is_displayable()) {
        println!("{}", thumbnail.url());
    }
    if !item.description.trim().is_empty() {
        println!("\n{}", item.description.trim());
    }
}
