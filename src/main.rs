#![doc = include_str!("../README.md")]

mod api;
mod cli;
mod core;
mod fmt;
mod prelude;
mod tables;

use clap::{Parser, crate_version};

use crate::{
    cli::{Args, Command},
    prelude::*,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().without_time().compact().init();
    info!(version = crate_version!(), "starting…");

    match Args::parse().command {
        Command::Mix(args) => {
            cli::mix(&args).await?;
            args.heartbeat.send().await;
        }
        Command::Utilizations(args) => {
            cli::utilizations(&args).await?;
        }
        Command::Watch(args) => {
            cli::watch(&args).await?;
        }
    }
    Ok(())
}
