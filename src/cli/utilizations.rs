use clap::Parser;

use crate::{
    api::ned::UtilizationSource,
    cli::{NedArgs, WindowArgs},
    core::source_type::SourceType,
    prelude::*,
};

#[derive(Parser)]
pub struct UtilizationsArgs {
    #[clap(flatten)]
    pub ned: NedArgs,

    #[clap(flatten)]
    pub window: WindowArgs,

    /// Source type to dump.
    #[clap(long = "source-type", value_enum)]
    pub source_type: SourceType,
}

#[instrument(skip_all)]
pub async fn utilizations(args: &UtilizationsArgs) -> Result {
    let api = args.ned.api()?;
    let utilizations = api.get_utilizations(args.source_type, args.window.window()?).await?;
    info!(n_utilizations = utilizations.len(), "gotcha");
    for utilization in utilizations {
        info!(valid_from = %utilization.valid_from, volume = utilization.volume);
    }
    Ok(())
}
