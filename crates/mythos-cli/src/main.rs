//! `mythos` -- validate and inspect a Mythos content tree.
//!
//! Commands:
//! - `check` - load every extension and spawn every instance, print counts
//! - `show <reference>` - print a resolved abstract as JSON
//! - `instances` - list instances with room and exit counts
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use log::info;

use mythos_core::EntityKey;
use mythos_core::reference::{SEPARATOR, resolve_reference};
use mythos_world::{GameDataManager, spawn_instance};

#[derive(Parser)]
#[command(name = "mythos")]
#[command(about = "Validate and inspect Mythos world content")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// World config file, or a directory containing world.{ron,toml,json}
    #[arg(short, long, default_value = "world.toml", global = true)]
    config: PathBuf,

    /// Verbose logging (-v, -vv for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Load all content and report what was resolved
    Check,
    /// Print one resolved abstract
    Show {
        /// `extension/kind/key`, or shorter with --extension / --kind
        reference: String,
        /// Extension used when the reference omits it
        #[arg(short, long)]
        extension: Option<String>,
        /// Kind used when the reference omits it
        #[arg(short, long)]
        kind: Option<String>,
    },
    /// List every instance
    Instances,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut manager = GameDataManager::from_config(&cli.config)
        .with_context(|| format!("reading config {}", cli.config.display()))?;
    let data = manager.load().context("loading game data")?;

    match cli.command {
        Commands::Check => {
            let mut spawned = 0;
            for instance in data.instances() {
                spawn_instance(instance).with_context(|| {
                    format!("spawning instance {}/{}", instance.extension, instance.name)
                })?;
                spawned += 1;
            }
            info!("spawned {spawned} instance(s)");
            println!("ok: {}", data.summary());
        }
        Commands::Show {
            reference,
            extension,
            kind,
        } => {
            let key = show_key(&reference, extension.as_deref(), kind.as_deref())?;
            let fields = data.get_abstract(&key.extension, &key.kind, &key.key)?;
            println!("{}", serde_json::to_string_pretty(fields)?);
        }
        Commands::Instances => {
            for instance in data.instances() {
                println!(
                    "{}/{}\t{} rooms\t{} exits\tclass {}",
                    instance.extension,
                    instance.name,
                    instance.room_count(),
                    instance.exit_count(),
                    instance.instance.class_path()
                );
            }
        }
    }
    Ok(())
}

/// Expand a `show` reference, refusing short forms whose omitted segments
/// have no default on the command line.
fn show_key(reference: &str, extension: Option<&str>, kind: Option<&str>) -> Result<EntityKey> {
    let segments: Vec<&str> = reference.split(SEPARATOR).collect();
    if segments.iter().all(|s| !s.is_empty()) {
        match (segments.len(), extension, kind) {
            (1 | 2, None, _) => {
                bail!("reference '{reference}' has no extension; pass --extension or a full path")
            }
            (1, _, None) => {
                bail!("reference '{reference}' has no kind; pass --kind or use kind/key")
            }
            _ => {}
        }
    }
    let key = resolve_reference(
        reference,
        extension.unwrap_or_default(),
        kind.unwrap_or_default(),
    )?;
    Ok(key)
}

fn init_logging(verbosity: u8) {
    let mut builder = env_logger::Builder::new();
    let base_level = match verbosity {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);
    // RUST_LOG, when set, refines the level chosen above.
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }
    let _ = builder.try_init();
}
