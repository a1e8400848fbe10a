//! Handler for the `watch` command.
//!
//! A thin scheduler around the stateless divergence run: fixed interval
//! with random jitter so successive runs don't hit the exchanges at
//! perfectly regular times. Failed runs are logged and the loop continues;
//! ctrl-c is handled by main's select.

use std::time::Duration;

use rand::Rng;
use tracing::{error, info};

use crate::cli::WatchArgs;
use crate::config::Config;
use crate::error::Result;

/// Execute the `watch` command. Runs until the process is interrupted.
pub async fn execute(mut config: Config, args: &WatchArgs) -> Result<()> {
    super::monitor::apply_overrides(&mut config, &args.monitor)?;

    let interval = args.interval.max(5) as i64;
    let jitter = args.jitter as i64;
    info!(interval, jitter, "watch loop starting");

    let mut run_idx: u64 = 0;
    loop {
        run_idx += 1;
        info!(run = run_idx, "divergence run starting");

        match super::monitor::run_once(&config).await {
            Ok(()) => info!(run = run_idx, "divergence run ok"),
            Err(e) => error!(run = run_idx, error = %e, "divergence run failed"),
        }

        let sleep_for = if jitter > 0 {
            (interval + rand::thread_rng().gen_range(-jitter..=jitter)).max(1)
        } else {
            interval
        };
        tokio::time::sleep(Duration::from_secs(sleep_for as u64)).await;
    }
}
