mod cli;

use anyhow::Context;
use chrono::Utc;
use github_client::{time, Error, GitHubClient, RateLimit, RateLimitRecord};
use log::{info, warn};
use serde_json::{json, Value};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let matches = cli::build_cli().get_matches();
    let log_level = matches.get_one::<String>("log-level").cloned();
    cli::init_logging(log_level.as_deref());

    if matches.get_flag("version") {
        println!("github-client {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    match matches.subcommand() {
        Some(("rate-limit", _)) => {
            let client = GitHubClient::from_env()?;
            info!("Fetching rate limits from {}", client.config().api_url);
            let rate = match client.rate_limit().await {
                Ok(rate) => rate,
                Err(Error::Api(e)) if e.is_retriable() => {
                    let core = client.last_rate_limit().core;
                    match core.reset_date().filter(|_| !core.is_unknown()) {
                        Some(reset) => warn!("retry after {}", time::print_date(&reset)),
                        None => warn!("request can be retried later"),
                    }
                    return Err(Error::Api(e).into());
                }
                Err(e) => return Err(e.into()),
            };
            println!("{}", serde_json::to_string(&rate_limit_json(&rate))?);
        }
        Some(("parse-date", sub)) => {
            let text = sub
                .get_one::<String>("text")
                .context("missing timestamp text")?;
            let parsed = time::parse_date(text)?;
            println!("{}", time::print_date(&parsed));
        }
        Some(("print-date", sub)) => {
            let instant = match sub.get_one::<i64>("epoch") {
                Some(epoch) => time::parse_epoch_seconds(*epoch)
                    .with_context(|| format!("epoch out of range: {}", epoch))?,
                None => Utc::now(),
            };
            println!("{}", time::print_date(&instant));
        }
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}

fn record_json(record: &RateLimitRecord) -> Value {
    if record.is_unknown() {
        return json!({ "unknown": true });
    }
    json!({
        "limit": record.limit(),
        "remaining": record.remaining(),
        "reset": record.reset_date().map(|d| time::print_date(&d)),
    })
}

fn rate_limit_json(rate: &RateLimit) -> Value {
    json!({
        "core": record_json(&rate.core),
        "search": record_json(&rate.search),
        "graphql": record_json(&rate.graphql),
        "integration_manifest": record_json(&rate.integration_manifest),
    })
}
