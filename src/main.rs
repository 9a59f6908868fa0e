//! Bukukas main entry point

use anyhow::Context;
use bukukas_api::start_server;
use bukukas_config::{Config, ConfigResult};
use clap::Parser;
use std::path::PathBuf;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "bukukas")]
#[command(version)]
#[command(about = "Convert Tanggal/Uraian/Penerimaan/Pengeluaran/Saldo workbooks to JSON and back", long_about = None)]
struct Args {
    /// Configuration file path; defaults are used when it does not exist
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print the default configuration file and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let config = match load_config(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.to_details());
            return Err(anyhow::Error::new(e)
                .context(format!("Failed to load configuration from {}", args.config.display())));
        }
    };

    // RUST_LOG wins over the configured level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.logging.level.as_str()))
        .init();

    if args.config.exists() {
        log::info!(target: "bukukas::main", "Config loaded from {}", args.config.display());
    } else {
        log::info!(target: "bukukas::main", "No config at {}, using defaults", args.config.display());
    }

    let rt = Runtime::new()?;
    rt.block_on(start_server(config))
        .context("Server error")?;

    Ok(())
}

fn load_config(path: &std::path::Path) -> ConfigResult<Config> {
    let mut config = Config::load_or_default(path)?;
    config.apply_env_overrides()?;
    Ok(config)
}
