mod cli;
mod config_file;
mod persist;
mod runner;

use std::process::ExitCode;

use clap::Parser;
use engine_logging::engine_error;
use evs_core::NodeInputs;
use evs_engine::EngineHandle;
use log::LevelFilter;

use crate::cli::Args;
use crate::config_file::FileConfig;

fn main() -> ExitCode {
    let args = Args::parse();
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    engine_logging::initialize(args.log.into(), level);

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            engine_error!("{:#}", err);
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<bool> {
    let file = args.config.as_deref().map(FileConfig::load).transpose()?;
    let values = args.input_values(file);
    let inputs = NodeInputs::from_source(&values)?;

    let engine = EngineHandle::new(args.transport())?;
    let summary = runner::run_invocation(&engine, inputs)?;

    let json = serde_json::to_string_pretty(&summary)?;
    println!("{json}");
    if let Some(path) = &args.output {
        persist::write_atomic(path, &json)?;
    }
    Ok(summary.succeeded())
}
