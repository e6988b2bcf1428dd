use std::{fs::File, io::Read};

use anyhow::{Context, Result};
use cash_safe::{
    bin_utils::{
        Service,
        args::{CliArgs, Command},
    },
    storage::{StoreError, file_store::FileStore},
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    let store = FileStore::open(&args.data_dir)
        .with_context(|| format!("Failed to open `{}`", args.data_dir.display()))?;

    let input: Box<dyn Read> = match &args.command {
        Command::Import { file: Some(path) } => Box::new(
            File::open(path).with_context(|| format!("Failed to open `{}`", path.display()))?,
        ),
        _ => Box::new(std::io::stdin()),
    };

    let service = Service {
        store,
        input,
        output: &mut std::io::stdout(),
        warning_printer: Box::new(|err: &StoreError| {
            eprintln!("Warning: changes were not saved: {err}");
        }),
    };
    service.run(args.command)
}
