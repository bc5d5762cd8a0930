//! Latch Engine Editor
//!
//! Asset browser front-end: scans a project folder, prints the asset tree and
//! persists the asset registry.

use anyhow::{Context, Result};
use clap::Parser;
use latch_asset::{AssetHandle, AssetManager, AssetSettings, AssetType, SerializerRegistry};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Scan a Latch project and list its assets
#[derive(Parser)]
#[command(name = "latch-editor")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Scan a Latch project and list its assets", long_about = None)]
struct Cli {
    /// Project folder to scan
    #[arg(value_name = "PROJECT", default_value = ".")]
    project: PathBuf,

    /// Load settings from a JSON file (command-line flags still apply on top)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Registry file (default: <PROJECT>/.latch/asset_registry.json)
    #[arg(short, long)]
    registry: Option<PathBuf>,

    /// Also scan entries starting with a dot
    #[arg(long)]
    include_hidden: bool,

    /// Do not write the registry back
    #[arg(long)]
    no_save: bool,

    /// Print the sorted flat view instead of the tree
    #[arg(long)]
    flat: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    tracing::info!("Latch Editor v{}", latch_asset::VERSION);

    let settings = build_settings(&cli)?;
    tracing::info!("Scanning project {}", settings.project_folder.display());

    let manager = AssetManager::open(settings, SerializerRegistry::new())
        .context("failed to open asset registry")?;

    for failure in manager.scan_failures() {
        tracing::warn!("Skipped {}: {}", failure.path, failure.reason);
    }

    if cli.flat {
        for asset in manager.sorted() {
            println!("{:<10} {}  {}", asset.asset_type(), asset.handle(), asset.path());
        }
    } else {
        print_tree(&manager, manager.root(), 0);
    }

    for asset_type in AssetType::ALL {
        let count = manager
            .sorted()
            .filter(|asset| asset.asset_type() == asset_type)
            .count();
        if count > 0 {
            tracing::info!("{asset_type}: {count}");
        }
    }

    if !cli.no_save {
        manager
            .save_registry()
            .context("failed to save asset registry")?;
        tracing::info!("Registry saved ({} entries)", manager.registry().len());
    }

    Ok(())
}

fn build_settings(cli: &Cli) -> Result<AssetSettings> {
    let mut settings = match &cli.settings {
        Some(file) => {
            let text = std::fs::read_to_string(file)
                .with_context(|| format!("failed to read settings {}", file.display()))?;
            serde_json::from_str::<AssetSettings>(&text)
                .with_context(|| format!("failed to parse settings {}", file.display()))?
        }
        None => AssetSettings::new(&cli.project),
    };

    if cli.registry.is_some() {
        settings.registry_file = cli.registry.clone();
    }
    if cli.include_hidden {
        settings.skip_hidden = false;
    }
    Ok(settings)
}

fn print_tree(manager: &AssetManager, handle: AssetHandle, depth: usize) {
    let Some(asset) = manager.get(handle) else {
        return;
    };
    let marker = if asset.is_directory() { "/" } else { "" };
    println!(
        "{:indent$}{}{marker}  [{}]",
        "",
        asset.filename(),
        asset.asset_type(),
        indent = depth * 2
    );
    for child in asset.children() {
        print_tree(manager, *child, depth + 1);
    }
}
