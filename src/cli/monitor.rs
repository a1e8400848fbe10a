//! Handler for the `monitor` command.

use tracing::info;

use crate::app::{monitor, report};
use crate::cli::MonitorArgs;
use crate::config::Config;
use crate::error::{ConfigError, Result};
use crate::exchange::create_source;
use crate::store::SqliteStore;

/// Apply CLI overrides shared by `monitor` and `watch`.
pub fn apply_overrides(config: &mut Config, args: &MonitorArgs) -> Result<()> {
    if let Some(ref exchanges) = args.exchanges {
        let list: Vec<String> = exchanges
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if list.len() != 2 {
            return Err(ConfigError::InvalidValue {
                field: "exchanges",
                reason: format!("need exactly 2 comma-separated exchanges, got {}", list.len()),
            }
            .into());
        }
        config.monitor.exchanges = list;
    }
    if let Some(ref db) = args.db {
        config.store.path = db.clone();
    }
    if let Some(top) = args.top {
        config.monitor.top_n = top;
    }
    Ok(())
}

/// Execute one divergence run against the configured exchange pair.
pub async fn run_once(config: &Config) -> Result<()> {
    let store = SqliteStore::open(&config.store.path)?;
    info!(db = %config.store.path, "history store ready");

    let http = super::http_client()?;
    let source_a = create_source(&config.monitor.exchanges[0], http.clone())?;
    let source_b = create_source(&config.monitor.exchanges[1], http)?;

    let outcome = monitor::run(source_a.as_ref(), source_b.as_ref(), config, &store).await?;

    report::print_divergences(
        &outcome.divergences,
        &outcome.exchange_a,
        &outcome.exchange_b,
        config.monitor.top_n,
    );
    if let Some(ref alert) = outcome.alert {
        report::print_alert(alert);
    }
    Ok(())
}

/// Execute the `monitor` command.
pub async fn execute(mut config: Config, args: &MonitorArgs) -> Result<()> {
    apply_overrides(&mut config, args)?;
    run_once(&config).await
}
