use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use inventory_api::{
    client::{filter_items, ClientConfig, InventoryClient, InventoryStats, DEFAULT_PRIMARY_URL},
    entities::item::Model as ItemModel,
    models::{NewItem, PriceResult},
};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;

#[derive(Parser)]
#[command(name = "inventory", about = "Manage inventory items and look up online prices", version)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON"
    )]
    json: bool,
    #[arg(
        long,
        global = true,
        env = "INVENTORY_PRIMARY_URL",
        default_value = DEFAULT_PRIMARY_URL,
        help = "Base URL of the primary inventory service"
    )]
    primary_url: String,
    #[arg(
        long,
        global = true,
        env = "INVENTORY_FALLBACK_URL",
        help = "Base URL of the fallback service used for count and clear"
    )]
    fallback_url: Option<String>,
    #[arg(long, global = true, default_value_t = 10, help = "Request timeout in seconds")]
    timeout_secs: u64,
    #[arg(long, global = true, action = ArgAction::SetTrue, help = "Log requests to stderr")]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add an item (an id is generated by the service)
    Add(AddArgs),
    /// Search items by name
    Search(SearchArgs),
    /// List every item
    List(ListArgs),
    /// Show how many items are stored
    Count,
    /// Summarise totals, categories, low-stock and recent items
    Stats,
    /// Delete one item by id
    Delete(DeleteArgs),
    /// Remove every item
    Clear,
    /// Search an online catalogue for prices
    Price(PriceArgs),
}

#[derive(Args)]
struct AddArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    quantity: i32,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    price: Option<Decimal>,
}

#[derive(Args)]
struct SearchArgs {
    keyword: String,
}

#[derive(Args)]
struct ListArgs {
    #[arg(long, help = "Only show items whose name, category or description contains this")]
    filter: Option<String>,
}

#[derive(Args)]
struct DeleteArgs {
    id: String,
}

#[derive(Args)]
struct PriceArgs {
    query: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.verbose {
        inventory_api::config::init_tracing("debug", false);
    }

    let client = InventoryClient::new(ClientConfig {
        primary_url: cli.primary_url.clone(),
        fallback_url: cli.fallback_url.clone(),
        timeout: Duration::from_secs(cli.timeout_secs),
    })
    .context("failed to configure inventory client")?;

    match cli.command {
        Commands::Add(args) => handle_add(&client, args, cli.json).await?,
        Commands::Search(args) => {
            let items = client
                .search_items(&args.keyword)
                .await
                .context("search failed")?;
            render_items(&items, cli.json, "No items found.")?;
        }
        Commands::List(args) => {
            let items = client.view_list().await.context("failed to list items")?;
            match args.filter.as_deref() {
                Some(term) => {
                    render_items(&filter_items(&items, term), cli.json, "No items match.")?
                }
                None => render_items(&items, cli.json, "The list is empty.")?,
            }
        }
        Commands::Count => {
            let count = client.count_items().await.context("failed to count items")?;
            if cli.json {
                print_json(&json!({ "count": count }))?;
            } else {
                println!("{} item(s) in the list", count);
            }
        }
        Commands::Stats => {
            let stats = client.stats().await.context("failed to summarise inventory")?;
            if cli.json {
                print_json(&stats)?;
            } else {
                render_stats(&stats)?;
            }
        }
        Commands::Delete(args) => {
            let message = client
                .delete_item(&args.id)
                .await
                .context("failed to delete item")?;
            if cli.json {
                print_json(&json!({ "message": message }))?;
            } else {
                println!("{}", message);
            }
        }
        Commands::Clear => {
            let response = client.clear_list().await.context("failed to clear list")?;
            if cli.json {
                print_json(&response)?;
            } else {
                println!("{}", response.message);
            }
        }
        Commands::Price(args) => {
            let results = client
                .search_online(&args.query)
                .await
                .context("price search failed")?;
            if cli.json {
                print_json(&results)?;
            } else {
                results.iter().for_each(render_price);
            }
        }
    }

    Ok(())
}

async fn handle_add(client: &InventoryClient, args: AddArgs, json: bool) -> Result<()> {
    let item = NewItem {
        name: args.name,
        quantity: Some(args.quantity),
        category: args.category,
        description: args.description,
        price: args.price,
    };

    let response = client.add_item(item).await.context("failed to add item")?;
    if json {
        print_json(&response)?;
    } else {
        println!("{} (id {})", response.message, response.item_id);
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn render_items(items: &[ItemModel], json: bool, empty: &str) -> Result<()> {
    if json {
        return print_json(&items);
    }
    if items.is_empty() {
        println!("{}", empty);
        return Ok(());
    }
    for item in items {
        let price = item
            .price
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "- {} • {} • qty {} • {} • price {}",
            item.id, item.name, item.quantity, item.category, price
        );
        if let Some(description) = &item.description {
            println!("    {}", description);
        }
    }
    Ok(())
}

fn render_stats(stats: &InventoryStats) -> Result<()> {
    println!("Total items: {}", stats.total_items);
    println!("Total quantity: {}", stats.total_quantity);
    println!("Total value: {}", stats.total_value);
    println!("Categories ({}): {}", stats.categories.len(), stats.categories.join(", "));
    println!("\nLow stock:");
    render_items(&stats.low_stock, false, "  none")?;
    println!("\nRecent items:");
    render_items(&stats.recent, false, "  none")
}

fn render_price(result: &PriceResult) {
    println!("- {} • {}", result.title, result.price);
    if !result.link.is_empty() {
        println!("    {}", result.link);
    }
}
