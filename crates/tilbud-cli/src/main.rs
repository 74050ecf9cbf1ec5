//! Command line interface for ad-hoc searches and guide rankings,
//! printing the same JSON shapes the server returns.

use std::collections::HashSet;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tilbud_core::{expand_query, is_grocery_store, is_junk_name, rank_stores, Offer};
use tilbud_scraper::DealsClient;

#[derive(Debug, Parser)]
#[command(name = "tilbud-cli")]
#[command(about = "Grocery deals command line interface")]
struct Cli {
    /// Maximum offer pages fetched per search term
    #[arg(long, default_value_t = 40)]
    limit: usize,
    /// Pacing delay between consecutive offer-page fetches, in milliseconds
    #[arg(long, default_value_t = 120)]
    delay_ms: u64,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch offers for a single search term and print them as JSON
    Search { term: String },
    /// Rank stores by how much of a shopping list they cover
    Guide { queries: Vec<String> },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = tilbud_core::load_app_config_from_env()?;
    let client = DealsClient::with_base_url(
        config.http_timeout_secs,
        &config.user_agent,
        &config.upstream_base_url,
    )?;

    let cli = Cli::parse();
    let delay = Duration::from_millis(cli.delay_ms);

    match cli.command {
        Commands::Search { term } => {
            let offers = client.fetch_offers(&term, cli.limit, delay).await?;
            println!("{}", serde_json::to_string_pretty(&offers)?);
        }
        Commands::Guide { queries } => {
            let offers = collect_guide_offers(&client, &queries, cli.limit, delay).await;
            let rows = rank_stores(&queries, &offers);
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }

    Ok(())
}

/// Fetch, expand, and filter offers for every query. A term whose fetch
/// fails contributes nothing; the ranking still runs on the rest.
async fn collect_guide_offers(
    client: &DealsClient,
    queries: &[String],
    limit: usize,
    delay: Duration,
) -> Vec<Offer> {
    let mut seen_terms = HashSet::new();
    let mut seen_urls = HashSet::new();
    let mut offers = Vec::new();

    for query in queries {
        for term in expand_query(query) {
            if !seen_terms.insert(term.clone()) {
                continue;
            }
            let batch = match client.fetch_offers(&term, limit, delay).await {
                Ok(batch) => batch,
                Err(e) => {
                    tracing::warn!(term, error = %e, "term fetch failed; contributing no offers");
                    continue;
                }
            };
            for offer in batch {
                if !seen_urls.insert(offer.source_url.clone()) {
                    continue;
                }
                if !offer.store.as_deref().is_some_and(is_grocery_store) {
                    continue;
                }
                if offer.name.as_deref().is_some_and(is_junk_name) {
                    continue;
                }
                offers.push(offer);
            }
        }
    }

    offers
}
