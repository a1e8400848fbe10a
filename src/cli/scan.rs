//! Handler for the `scan` command.

use crate::app::{report, scan};
use crate::cli::ScanArgs;
use crate::config::Config;
use crate::error::Result;
use crate::exchange::create_source;

/// Execute a single ticker-based triangle scan.
pub async fn execute(mut config: Config, args: &ScanArgs) -> Result<()> {
    if let Some(min_profit) = args.min_profit {
        config.scan.min_profit_pct = min_profit;
    }
    if let Some(top_k) = args.top_k {
        config.scan.top_k = top_k;
    }
    if let Some(top) = args.top {
        config.scan.top_n = top;
    }

    let source = create_source(&args.exchange, super::http_client()?)?;
    let triangles = scan::run(source.as_ref(), &config).await?;
    report::print_triangles(&triangles, config.scan.top_n);
    Ok(())
}
