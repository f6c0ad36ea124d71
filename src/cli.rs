pub mod heartbeat;
mod mix;
mod utilizations;
mod watch;

use std::time::Duration;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use reqwest::Url;

pub use self::{
    mix::{MixArgs, mix},
    utilizations::{UtilizationsArgs, utilizations},
    watch::{WatchArgs, watch},
};
use crate::{
    api::ned::{self, Api},
    core::window::Window,
    prelude::*,
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fetch the energy mix for the window and print the breakdown.
    #[clap(name = "mix")]
    Mix(Box<MixArgs>),

    /// Dump the raw utilizations of a single source type.
    #[clap(name = "utilizations")]
    Utilizations(Box<UtilizationsArgs>),

    /// Poll the energy mix on an interval and publish the latest record.
    #[clap(name = "watch")]
    Watch(Box<WatchArgs>),
}

#[derive(Parser)]
pub struct NedArgs {
    /// NED API key.
    #[clap(long = "api-key", env = "NED_API_KEY", hide_env_values = true)]
    pub api_key: String,

    #[clap(long = "base-url", env = "NED_BASE_URL", default_value = ned::DEFAULT_BASE_URL)]
    pub base_url: Url,

    /// Per-request timeout.
    #[clap(long = "request-timeout", default_value = "10s", value_parser = humantime::parse_duration)]
    pub timeout: Duration,

    /// Skip certificate verification towards the API.
    #[clap(long = "danger-accept-invalid-certs")]
    pub accept_invalid_certs: bool,
}

impl NedArgs {
    pub fn api(&self) -> Result<Api> {
        Api::new(&self.api_key, self.base_url.clone(), self.timeout, self.accept_invalid_certs)
    }
}

#[derive(Copy, Clone, Parser)]
pub struct WindowArgs {
    /// Number of days up to and including today.
    #[clap(long, default_value = "1", conflicts_with_all = ["from", "till"])]
    pub days: u64,

    /// Window start date (inclusive).
    #[clap(long, requires = "till")]
    pub from: Option<NaiveDate>,

    /// Window end date (exclusive).
    #[clap(long, requires = "from")]
    pub till: Option<NaiveDate>,
}

impl WindowArgs {
    pub fn window(self) -> Result<Window> {
        match (self.from, self.till) {
            (Some(from), Some(till)) => Window::new(from, till),
            _ => Window::last_days(self.days),
        }
    }
}
