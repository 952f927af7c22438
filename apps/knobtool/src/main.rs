use std::{io, path::PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use knob_setter::CoercionTable;
use ledger::NameLedger;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use crate::commands::TerminalConfirm;
use crate::config::load_settings;

#[derive(Parser, Debug)]
#[command(about = "Gather, count and set knobs on a node graph scene")]
struct Cli {
    /// Settings file; defaults to ./knobtool.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write every knob name in the scene to a new ledger and count them.
    Gather {
        scene: PathBuf,
        #[arg(long)]
        recursive: bool,
        #[arg(long)]
        dir: Option<PathBuf>,
        #[arg(long)]
        name: Option<String>,
    },
    Count {
        ledger: PathBuf,
    },
    /// Remove signed ledgers from a directory.
    Clear {
        #[arg(long)]
        dir: Option<PathBuf>,
        #[arg(long)]
        safe: bool,
    },
    Classes {
        scene: PathBuf,
    },
    Knobs {
        scene: PathBuf,
        class: String,
    },
    /// Set a knob on every node of a class.
    Set {
        scene: PathBuf,
        class: String,
        knob: String,
        #[arg(allow_hyphen_values = true)]
        value: String,
        #[arg(long)]
        output: Option<PathBuf>,
        /// Print the updated nodes as JSON.
        #[arg(long)]
        json: bool,
    },
    Coerce {
        kind: String,
        arity: usize,
        #[arg(allow_hyphen_values = true)]
        value: String,
        #[arg(long)]
        scene: Option<PathBuf>,
    },
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let ledger = NameLedger::new(settings.signature.clone());
    let table = CoercionTable::standard();
    let mut out = io::stdout().lock();

    match cli.command {
        Command::Gather {
            scene,
            recursive,
            dir,
            name,
        } => {
            commands::gather(
                &settings,
                &ledger,
                &scene,
                recursive,
                dir.as_deref(),
                name.as_deref(),
                &mut out,
            )?;
        }
        Command::Count { ledger } => commands::count(&ledger, &mut out)?,
        Command::Clear { dir, safe } => {
            let directory = dir.unwrap_or_else(|| settings.ledger_dir.clone());
            commands::clear(&ledger, &directory, safe, &mut TerminalConfirm, &mut out)?;
        }
        Command::Classes { scene } => commands::classes(&scene, &mut out)?,
        Command::Knobs { scene, class } => commands::knobs(&scene, &class, &mut out)?,
        Command::Set {
            scene,
            class,
            knob,
            value,
            output,
            json,
        } => {
            commands::set(
                &table,
                &scene,
                &class,
                &knob,
                &value,
                output.as_deref(),
                json,
                &mut out,
            )?;
        }
        Command::Coerce {
            kind,
            arity,
            value,
            scene,
        } => commands::coerce(&table, &kind, arity, &value, scene.as_deref(), &mut out)?,
        Command::Config => commands::show_config(&settings, &mut out)?,
    }

    Ok(())
}
