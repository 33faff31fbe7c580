pub mod assemble;
pub mod cli;
pub mod codec;
pub mod error;
pub mod generate;
pub mod generators;
pub mod inspect;
pub mod io_utils;
pub mod pool;
pub mod report;
pub mod template;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Commands};

pub use crate::{
    assemble::RecordAssembler,
    error::GenerateError,
    pool::{FieldPools, GenerateOptions},
    template::Template,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("json_ndv_gen", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Generate(args) => generate::execute(&args),
        Commands::Inspect(args) => inspect::execute(&args),
        Commands::Report(args) => report::execute(&args),
    }
}
