use std::path::PathBuf;

use anyhow::Result;
use chatml_packer::count_game_outcomes;
use clap::Parser;
use env_logger::Env;

/// Count how many games each faction won.
#[derive(Debug, Parser)]
#[command(author, version, about = "Tally game winners from game_complete.json files", long_about = None)]
struct Cli {
    /// Directory containing game folders
    #[arg(long = "logs_dir", alias = "logs-dir", value_name = "DIR")]
    logs_dir: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let tally = count_game_outcomes(&cli.logs_dir)?;
    println!("Villagers won {} games", tally.villager_wins);
    println!("Werewolves won {} games", tally.werewolf_wins);
    if tally.unresolved > 0 {
        println!("{} completed games had no recognised winner", tally.unresolved);
    }
    Ok(())
}
