use clap::Parser;
use league_analytics::{build_report, SparseSamplePolicy};
use tracing::info;
use tracing_subscriber::EnvFilter;
use yahoo_fetcher::{fetch_season, YahooClient, YahooConfig};

/// Fetch the logged-in user's league and print the season report as JSON
#[derive(Parser, Debug)]
#[command(name = "fetch-season")]
struct Args {
    /// Bearer token; defaults to YAHOO_ACCESS_TOKEN
    #[arg(long, env = "YAHOO_ACCESS_TOKEN")]
    token: String,

    /// How to report teams with fewer than two weekly scores
    #[arg(long, default_value = "undefined")]
    sparse_samples: SparseSamplePolicy,

    /// Print the raw responses instead of the report
    #[arg(long)]
    raw: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let config = YahooConfig::api_from_env()?;
    let client = YahooClient::new(config)?;
    let raw = fetch_season(&client, &args.token).await?;
    info!("Fetched {} weeks for {}", raw.scoreboards.len(), raw.league_key);

    if args.raw {
        let weeks: Vec<_> = raw.scoreboards.iter().map(|s| &s.body).collect();
        let dump = serde_json::json!({
            "league_key": raw.league_key,
            "teams": raw.teams,
            "standings": raw.standings,
            "scoreboards": weeks,
        });
        println!("{}", serde_json::to_string_pretty(&dump)?);
        return Ok(());
    }

    let report = build_report(&raw, args.sparse_samples)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
