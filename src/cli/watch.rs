use std::time::Duration;

use clap::Parser;
use tokio::time::sleep;

use crate::{
    cli::{NedArgs, WindowArgs, heartbeat::HeartbeatArgs},
    core::mix::{EnergyMixRecord, compute_energy_mix},
    fmt::FormattedPercentage,
    prelude::*,
};

#[derive(Parser)]
pub struct WatchArgs {
    #[clap(flatten)]
    pub ned: NedArgs,

    #[clap(flatten)]
    pub window: WindowArgs,

    #[clap(flatten)]
    pub heartbeat: HeartbeatArgs,

    /// Polling interval.
    #[clap(long, default_value = "15m", value_parser = humantime::parse_duration)]
    pub interval: Duration,
}

/// Poll the energy mix on a fixed interval and publish the latest record as a
/// JSON line on stdout.
///
/// Runs are strictly sequential, and the last non-empty result is kept, so an
/// empty or failed poll never blanks out previously published values.
#[instrument(skip_all)]
pub async fn watch(args: &WatchArgs) -> Result {
    let api = args.ned.api()?;
    let mut cached: Vec<EnergyMixRecord> = Vec::new();
    loop {
        let records = compute_energy_mix(&api, args.window.window()?).await;
        if records.is_empty() {
            warn!(n_cached = cached.len(), "no data is available, keeping the cached records");
        } else {
            cached = records;
        }
        if let Some(latest) = cached.last() {
            info!(
                timestamp = %latest.timestamp,
                green = %FormattedPercentage(latest.green_percentage),
                "latest mix",
            );
            println!("{}", serde_json::to_string(latest)?);
        }
        args.heartbeat.send().await;
        sleep(args.interval).await;
    }
}
