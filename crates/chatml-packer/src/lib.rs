//! Convert multi-game werewolf simulation logs into ChatML fine-tuning data.
//!
//! The pipeline scans one directory per game, loads its log (and, when
//! filtering by winner, its outcome metadata), extracts eliminator and bidder
//! turns as formatted conversations, and hands both collections to a
//! [`DatasetSink`].

pub mod dataset;
pub mod extract;
pub mod format;
pub mod loader;
pub mod record;
pub mod scan;
pub mod tally;

use std::path::{Path, PathBuf};

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};

pub use dataset::{DatasetKind, DatasetSink, DiskDatasetSink};
pub use extract::{Example, ExampleSets, WinnerGate};
pub use format::format_conversation;
pub use loader::load_games;
pub use record::{ActionEntry, Faction, GameRecord, OutcomeMeta};
pub use scan::{GameBundle, discover_games, scan_games};
pub use tally::{OutcomeTally, count_game_outcomes};

/// Conversion configuration supplied by the CLI.
#[derive(Clone, Debug)]
pub struct ConvertOptions {
    /// Directory holding one subdirectory per game.
    pub logs_dir: PathBuf,
    /// Output directory for `werewolf_dataset/` and `villager_dataset/`.
    pub out_dir: PathBuf,
    /// Only keep each faction's turns from games that faction won.
    pub filter_by_winner: bool,
    /// Replace existing datasets when true.
    pub overwrite: bool,
}

/// Counters gathered while scanning a logs directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Game directories with a `game_logs.json`.
    pub games_seen: usize,
    /// Games that passed the winner gate.
    pub games_used: usize,
    /// Game records loaded from the used games.
    pub records: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertSummary {
    pub scan: ScanStats,
    pub werewolf_examples: usize,
    pub villager_examples: usize,
}

pub(crate) fn default_progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {wide_bar} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    pb
}

/// Scan `logs_dir` and collect werewolf and villager examples.
pub fn collect_examples(
    logs_dir: &Path,
    filter_by_winner: bool,
) -> Result<(ExampleSets, ScanStats)> {
    let games = discover_games(logs_dir)?;
    info!("Discovered {} game directories", games.len());

    let mut stats = ScanStats {
        games_seen: games.len(),
        ..ScanStats::default()
    };
    let mut sets = ExampleSets::new();

    let pb = if games.is_empty() {
        ProgressBar::hidden()
    } else {
        default_progress_bar(games.len() as u64)
    };
    for bundle in games {
        pb.set_message(bundle.game_id.clone());
        if let Some(game) = scan::scan_game(bundle, filter_by_winner)? {
            stats.games_used += 1;
            stats.records += game.records.len();
            for record in &game.records {
                if let Some(winner) = record.winner {
                    debug!("{}: record reports {winner} as winner", game.bundle.game_id);
                }
                sets.extend_from_record(record, game.gate);
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    if sets.is_empty() {
        warn!("No examples extracted from {}", logs_dir.display());
    }
    Ok((sets, stats))
}

/// Run the full conversion, writing both datasets to `sink`.
pub fn convert_logs_into<S: DatasetSink>(
    logs_dir: &Path,
    filter_by_winner: bool,
    sink: &mut S,
) -> Result<ConvertSummary> {
    let (sets, scan) = collect_examples(logs_dir, filter_by_winner)?;
    info!(
        "Used {}/{} games ({} records){}",
        scan.games_used,
        scan.games_seen,
        scan.records,
        if filter_by_winner { ", filtered by winner" } else { "" }
    );
    let werewolf_examples = sink.write_examples(DatasetKind::Werewolf, &sets.werewolf)?;
    let villager_examples = sink.write_examples(DatasetKind::Villager, &sets.villager)?;
    Ok(ConvertSummary {
        scan,
        werewolf_examples,
        villager_examples,
    })
}

/// Run the full conversion into datasets under `opts.out_dir`.
pub fn convert_logs(opts: &ConvertOptions) -> Result<ConvertSummary> {
    let mut sink = DiskDatasetSink::new(&opts.out_dir, opts.overwrite)?;
    convert_logs_into(&opts.logs_dir, opts.filter_by_winner, &mut sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[derive(Default)]
    struct MemorySink {
        written: Vec<(DatasetKind, Vec<Example>)>,
    }

    impl DatasetSink for MemorySink {
        fn write_examples(&mut self, kind: DatasetKind, examples: &[Example]) -> Result<usize> {
            self.written.push((kind, examples.to_vec()));
            Ok(examples.len())
        }
    }

    fn write_game(root: &Path, game: &str, logs: &str, meta: Option<&str>) {
        let dir = root.join(game);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(scan::GAME_LOG_FILE), logs).unwrap();
        if let Some(meta) = meta {
            fs::write(dir.join(scan::COMPLETE_META_FILE), meta).unwrap();
        }
    }

    #[test]
    fn filtered_run_routes_games_by_winner() {
        let tmp = tempdir().unwrap();
        let record = r#"{
            "winner": "Villagers",
            "eliminate": {"prompt": "kill?", "raw_resp": "Ann"},
            "bid": [[["Ann", {"prompt": "You are the Villager", "raw_resp": "5"}]]]
        }"#;
        write_game(tmp.path(), "wolves", record, Some(r#"{"winner": "Werewolves"}"#));
        write_game(tmp.path(), "village", record, Some(r#"{"winner": "Villagers"}"#));
        write_game(tmp.path(), "unfinished", record, None);

        let mut sink = MemorySink::default();
        let summary = convert_logs_into(tmp.path(), true, &mut sink).unwrap();
        assert_eq!(summary.scan.games_seen, 3);
        assert_eq!(summary.scan.games_used, 2);
        assert_eq!(summary.werewolf_examples, 1);
        assert_eq!(summary.villager_examples, 1);

        assert_eq!(sink.written[0].0, DatasetKind::Werewolf);
        assert!(sink.written[0].1[0].text.contains("kill?"));
        assert_eq!(sink.written[1].0, DatasetKind::Villager);
        assert!(sink.written[1].1[0].text.contains("You are the Villager"));
    }

    #[test]
    fn examples_keep_directory_then_record_order() {
        let tmp = tempdir().unwrap();
        write_game(
            tmp.path(),
            "g2",
            "{\"eliminate\": {\"prompt\": \"c\", \"raw_resp\": \"3\"}}\n",
            None,
        );
        write_game(
            tmp.path(),
            "g1",
            concat!(
                "{\"eliminate\": {\"prompt\": \"a\", \"raw_resp\": \"1\"}}\n",
                "{\"eliminate\": {\"prompt\": \"b\", \"raw_resp\": \"2\"}}\n",
            ),
            None,
        );

        let (sets, stats) = collect_examples(tmp.path(), false).unwrap();
        assert_eq!(stats.records, 3);
        let texts: Vec<String> = sets.werewolf.into_iter().map(|e| e.text).collect();
        assert_eq!(
            texts,
            vec![
                format_conversation("a", "1"),
                format_conversation("b", "2"),
                format_conversation("c", "3"),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn stale_symlink_does_not_abort_collection() {
        let tmp = tempdir().unwrap();
        write_game(
            tmp.path(),
            "g1",
            r#"[{"eliminate": {"prompt": "kill?", "raw_resp": "Ann"}}]"#,
            None,
        );
        std::os::unix::fs::symlink(tmp.path().join("gone"), tmp.path().join("stale")).unwrap();

        let (sets, stats) = collect_examples(tmp.path(), false).unwrap();
        assert_eq!(stats.games_seen, 1);
        assert_eq!(sets.werewolf.len(), 1);
        assert!(sets.villager.is_empty());
    }

    #[test]
    fn empty_logs_dir_produces_empty_datasets() {
        let tmp = tempdir().unwrap();
        let mut sink = MemorySink::default();
        let summary = convert_logs_into(tmp.path(), false, &mut sink).unwrap();
        assert_eq!(summary.scan, ScanStats::default());
        assert_eq!(sink.written.len(), 2);
        assert!(sink.written.iter().all(|(_, rows)| rows.is_empty()));
    }
}
