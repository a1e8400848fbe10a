//! Handler for the `depth` command.

use crate::app::{depth, report};
use crate::cli::DepthArgs;
use crate::config::Config;
use crate::error::Result;
use crate::exchange::create_source;

/// Execute a single depth-walking triangle scan.
pub async fn execute(mut config: Config, args: &DepthArgs) -> Result<()> {
    if let Some(notional) = args.notional {
        config.depth.notional = notional;
    }
    if let Some(max_markets) = args.max_markets {
        config.depth.max_markets = max_markets;
    }
    if let Some(top) = args.top {
        config.scan.top_n = top;
    }

    let source = create_source(&args.exchange, super::http_client()?)?;
    let outcome = depth::run(source.as_ref(), &config).await?;

    if !outcome.skipped.is_empty() {
        println!(
            "Skipped {} of {} markets (fetch failures or empty books).",
            outcome.skipped.len(),
            outcome.markets_used + outcome.skipped.len()
        );
    }
    report::print_triangles(&outcome.triangles, config.scan.top_n);
    Ok(())
}
