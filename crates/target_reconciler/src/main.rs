// SPDX-License-Identifier: Apache-2.0

mod assemble;
mod catalog;
mod compare;
mod fetch;
mod matcher;
mod models;
mod repo_map;
mod report;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::models::config::ReconcilerConfig;
use crate::models::target::Target;

/// Rewrites Eclipse PDE .target files against a delivery report and live p2
/// repository metadata during release promotion.
#[derive(Parser)]
#[command(name = "target-reconciler")]
struct Cli {
    /// Reconciler configuration XML
    #[arg(long, default_value = "input/appdata/reconciler.xml")]
    config: PathBuf,

    /// Directory scanned recursively for input .target files
    #[arg(long, default_value = "input/targets")]
    targets_dir: PathBuf,

    /// Directory the rewritten .target files are written to
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Compare generated targets against the originals after assembly
    #[arg(short, long, default_value_t = false)]
    compare: bool,

    /// Tracing filter, e.g. "info" or "target_reconciler=debug"
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    run(cli).await
}

async fn run(cli: Cli) -> Result<()> {
    info!("starting target reconciliation");
    let config = ReconcilerConfig::from_file(&cli.config)?;

    let input_targets = load_targets(&cli.targets_dir);
    if input_targets.is_empty() {
        bail!("no target files found under {}", cli.targets_dir.display());
    }
    info!("loaded {} input targets", input_targets.len());

    let client = reqwest::Client::new();
    let records = report::load(&config, &client).await;

    let repo_map = repo_map::build(&input_targets, &records, &config.patterns);
    let repos = repo_map::distinct_repos(&repo_map);
    if repos.is_empty() {
        bail!("no repository urls resolved for any target");
    }
    info!("resolved {} distinct repositories", repos.len());

    let catalogs = fetch::fetch_all(&repos, &client).await;
    let units_by_repo = catalog::parse_all(catalogs).await;
    if units_by_repo.values().all(Vec::is_empty) {
        bail!("no units parsed from any repository");
    }

    let outputs = assemble::assemble(
        &input_targets,
        &repo_map,
        &units_by_repo,
        &records,
        &config.version,
        &config.target_save_format,
    );
    write_outputs(&cli.output_dir, &outputs)?;

    if cli.compare {
        compare::compare_targets(&outputs, &input_targets);
    }
    info!("wrote {} target files to {}", outputs.len(), cli.output_dir.display());
    Ok(())
}

/// Recursively collects and parses every `.target` file under `dir`, sorted
/// by path for deterministic ordering. Unparseable files are logged and
/// skipped.
fn load_targets(dir: &Path) -> Vec<Target> {
    let mut files = Vec::new();
    collect_target_files(dir, &mut files);
    files.sort();

    let mut targets = Vec::new();
    for path in files {
        match std::fs::read_to_string(&path)
            .map_err(anyhow::Error::from)
            .and_then(|xml| Target::from_xml(&xml))
        {
            Ok(target) => targets.push(target),
            Err(err) => error!("skipping malformed target file {}: {err:#}", path.display()),
        }
    }
    targets
}

fn collect_target_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        error!("failed to read directory {}", dir.display());
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_target_files(&path, out);
        } else if path.extension().is_some_and(|ext| ext == "target") {
            out.push(path);
        }
    }
}

fn write_outputs(dir: &Path, outputs: &BTreeMap<String, Target>) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    for (file_name, target) in outputs {
        let path = dir.join(file_name);
        std::fs::write(&path, target.to_xml())
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("wrote {}", path.display());
    }
    Ok(())
}
