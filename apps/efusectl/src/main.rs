// Licensed under the Apache-2.0 license

use clap::{Parser, Subcommand};
use clap_num::maybe_hex;
use efuse_config::EfuseConfig;
use efuse_driver::{ClockGate, Efuse, EfuseError, MmioBus, NoClockGate, RegisterClockGate};
use efuse_emulator_periph::EmulatedEfuse;
use simple_logger::SimpleLogger;
use std::path::{Path, PathBuf};
use std::process::exit;

mod commands;

#[derive(Parser)]
#[command(version, about = "Read and program eFUSE words", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Run against an emulated macro persisted in this file instead of the
    /// hardware. The file is created on first use.
    #[arg(long, global = true)]
    emulate: Option<PathBuf>,

    /// Allow writes to blow fuses, overriding the configuration
    #[arg(long, global = true, default_value_t = false)]
    enable_programming: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Read one shadowed word
    Read {
        /// Byte address, word aligned, below 0x100
        #[arg(value_parser = maybe_hex::<u32>)]
        addr: u32,
    },
    /// Print the whole fuse space
    Dump,
    /// Program bits into one word
    Write {
        #[arg(value_parser = maybe_hex::<u32>)]
        addr: u32,
        #[arg(value_parser = maybe_hex::<u32>)]
        value: u32,
    },
    /// Read one physical row directly from the array
    PhysRead {
        /// Physical row index, `(word << 1) | row`
        #[arg(value_parser = maybe_hex::<u32>)]
        row: u32,
        /// Use a margin read instead of an array read
        #[arg(long, default_value_t = false)]
        margin: bool,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<EfuseConfig> {
    let config = match &cli.config {
        Some(path) => EfuseConfig::load(path)?,
        None => EfuseConfig::default(),
    };
    if cli.enable_programming {
        return Ok(config.with_programming_enabled(true));
    }
    Ok(config)
}

fn run_emulated(path: &Path, config: &EfuseConfig, command: &Commands) -> anyhow::Result<()> {
    let emulated = if path.exists() {
        EmulatedEfuse::load(path)?
    } else {
        log::info!("Creating blank eFUSE image {}", path.display());
        EmulatedEfuse::new()
    };
    let clock = emulated.clock();
    let efuse = Efuse::new(emulated.clone(), clock, config);

    let result = commands::execute(&efuse, command);
    efuse.shutdown();
    emulated.save(path)?;
    result
}

fn run_hardware(config: &EfuseConfig, command: &Commands) -> anyhow::Result<()> {
    let bus = MmioBus::map(config)?;
    let clock: Box<dyn ClockGate> = match &config.clock {
        Some(clock) => Box::new(RegisterClockGate::map(clock)?),
        None => Box::new(NoClockGate),
    };
    log::info!("Mapped eFUSE controller at {:#x}", config.base_address);
    let efuse = Efuse::new(bus, clock, config);

    let result = commands::execute(&efuse, command);
    efuse.shutdown();
    result
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli)?;
    config.validate()?;
    match &cli.emulate {
        Some(path) => run_emulated(path, &config, &cli.command),
        None => run_hardware(&config, &cli.command),
    }
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    if let Err(err) = SimpleLogger::new().with_level(level).init() {
        eprintln!("failed to install logger: {err}");
    }

    if let Err(err) = run(&cli) {
        eprintln!("efusectl: {err:#}");
        let code = err
            .downcast_ref::<EfuseError>()
            .map(EfuseError::errno)
            .unwrap_or(1);
        exit(code);
    }
}
