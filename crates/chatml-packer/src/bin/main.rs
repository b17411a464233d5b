use std::path::PathBuf;

use anyhow::Result;
use chatml_packer::{ConvertOptions, DatasetKind, DiskDatasetSink, convert_logs_into};
use clap::Parser;
use env_logger::Env;
use log::info;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Build Werewolf & Villager finetuning datasets from game logs"
)]
struct Cli {
    /// Folder containing one subdirectory of JSON game logs per game
    #[arg(long = "logs_dir", alias = "logs-dir", value_name = "DIR")]
    logs_dir: PathBuf,

    /// Output folder for `werewolf_dataset/` and `villager_dataset/`
    #[arg(long = "out_dir", alias = "out-dir", value_name = "DIR")]
    out_dir: PathBuf,

    /// Only emit Werewolf turns from games werewolves won, and Villager turns
    /// from games villagers won
    #[arg(long = "filter_by_winner", alias = "filter-by-winner")]
    filter_by_winner: bool,

    /// Replace existing datasets in the output folder
    #[arg(long)]
    overwrite: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let opts = ConvertOptions {
        logs_dir: cli.logs_dir,
        out_dir: cli.out_dir,
        filter_by_winner: cli.filter_by_winner,
        overwrite: cli.overwrite,
    };

    let mut sink = DiskDatasetSink::new(&opts.out_dir, opts.overwrite)?;
    let summary = convert_logs_into(&opts.logs_dir, opts.filter_by_winner, &mut sink)?;
    info!(
        "Completed conversion: {}/{} games, {} records",
        summary.scan.games_used, summary.scan.games_seen, summary.scan.records
    );

    for (kind, count) in [
        (DatasetKind::Werewolf, summary.werewolf_examples),
        (DatasetKind::Villager, summary.villager_examples),
    ] {
        println!(
            "Saved {count} {} examples -> {}",
            kind.label(),
            sink.dataset_dir(kind).display()
        );
        info!(
            "{} is ready to publish as {}",
            kind.dir_name(),
            sink.hub_repo_id(kind)
        );
    }
    Ok(())
}
