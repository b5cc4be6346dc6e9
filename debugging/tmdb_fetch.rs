//! Run a single node operation against TMDB and print the enriched JSON.
//! Usage:
//!   cargo run --bin tmdb_fetch -- get_movie --id 603 --append credits,images
//!   cargo run --bin tmdb_fetch -- get_movie_list --list popular --page 2 --region GB
//!   cargo run --bin tmdb_fetch -- check
//! Requires TMDB_API_TOKEN in the environment (.env supported).

use anyhow::{Context, Result};
use clap::Parser;
use dotenvy::dotenv;
use serde_json::{Map, Value};
use tmdb_node::config::Settings;
use tmdb_node::{execute_item, Operation, TmdbApi, TmdbClient};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Fetch one TMDB resource and print it with image URLs")]
struct Args {
    /// Operation token (get_movie, get_tv, ...) or `check` to test credentials
    operation: String,

    /// Resource id (movie, TV, person, company or collection)
    #[arg(long)]
    id: Option<u64>,

    #[arg(long, default_value = "en")]
    language: String,

    /// Value for append_to_response, passed through as-is
    #[arg(long)]
    append: Option<String>,

    /// Movie list type for get_movie_list
    #[arg(long)]
    list: Option<String>,

    #[arg(long)]
    page: Option<u64>,

    #[arg(long)]
    region: Option<String>,
}

impl Args {
    fn item(&self, op: Operation) -> Value {
        let mut item = Map::new();
        item.insert("operation".into(), op.as_str().into());
        item.insert("language".into(), self.language.clone().into());
        let id_key = match op {
            Operation::GetCollection => Some("collection_id"),
            Operation::GetCompany => Some("company_id"),
            Operation::GetMovie => Some("movie_id"),
            Operation::GetPerson => Some("person_id"),
            Operation::GetTv => Some("tv_id"),
            Operation::GetMovieList => None,
        };
        if let (Some(key), Some(id)) = (id_key, self.id) {
            item.insert(key.into(), id.into());
        }
        if let Some(append) = &self.append {
            item.insert("append_to_response".into(), append.clone().into());
        }
        if let Some(list) = &self.list {
            item.insert("movie_list_type".into(), list.clone().into());
        }
        if let Some(page) = self.page {
            item.insert("page".into(), page.into());
        }
        if let Some(region) = &self.region {
            item.insert("region".into(), region.clone().into());
        }
        Value::Object(item)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let settings = Settings::from_env()?;
    let client = TmdbClient::new(settings.api_token, settings.api_base)?;

    if args.operation == "check" {
        client
            .test_credentials()
            .await
            .context("TMDB rejected the credentials")?;
        println!("TMDB credentials OK ({})", client.base());
        return Ok(());
    }

    let op: Operation = args.operation.parse()?;
    let out = execute_item(&client, &args.item(op)).await?;
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
