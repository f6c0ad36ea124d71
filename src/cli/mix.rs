use clap::Parser;

use crate::{
    cli::{NedArgs, WindowArgs, heartbeat::HeartbeatArgs},
    core::mix::compute_energy_mix,
    prelude::*,
    tables::build_mix_table,
};

#[derive(Parser)]
pub struct MixArgs {
    #[clap(flatten)]
    pub ned: NedArgs,

    #[clap(flatten)]
    pub window: WindowArgs,

    #[clap(flatten)]
    pub heartbeat: HeartbeatArgs,

    /// Also print the latest record as a JSON line.
    #[clap(long)]
    pub json: bool,
}

#[instrument(skip_all)]
pub async fn mix(args: &MixArgs) -> Result {
    let api = args.ned.api()?;
    let records = compute_energy_mix(&api, args.window.window()?).await;
    if records.is_empty() {
        warn!("no data is available for the window");
        return Ok(());
    }
    info!(n_records = records.len(), "computed the energy mix");
    println!("{}", build_mix_table(&records));
    if args.json
        && let Some(latest) = records.last()
    {
        println!("{}", serde_json::to_string(latest)?);
    }
    Ok(())
}
