use std::fs;
use std::path::Path;

use chatml_packer::dataset::{DATA_FILE, INFO_FILE};
use chatml_packer::{ConvertOptions, OutcomeTally, convert_logs, count_game_outcomes};
use serde_json::Value as JsonValue;
use tempfile::tempdir;

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn read_texts(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| {
            let value: JsonValue = serde_json::from_str(line).unwrap();
            value["text"].as_str().unwrap().to_string()
        })
        .collect()
}

fn two_game_logs(root: &Path) {
    write(
        &root.join("g1").join("game_logs.json"),
        r#"[{"winner":"Werewolves","eliminate":{"prompt":"P1","raw_resp":"R1"}}]"#,
    );
    write(
        &root.join("g2").join("game_logs.json"),
        r#"[{"bid":[[["A",{"prompt":"I am the Villager, bid?","raw_resp":"yes"}]]]}]"#,
    );
}

#[test]
fn unfiltered_conversion_writes_both_datasets() {
    let tmp = tempdir().unwrap();
    let logs = tmp.path().join("logs");
    let out = tmp.path().join("sft");
    two_game_logs(&logs);

    let summary = convert_logs(&ConvertOptions {
        logs_dir: logs,
        out_dir: out.clone(),
        filter_by_winner: false,
        overwrite: false,
    })
    .unwrap();
    assert_eq!(summary.werewolf_examples, 1);
    assert_eq!(summary.villager_examples, 1);

    let wolves = read_texts(&out.join("werewolf_dataset").join(DATA_FILE));
    assert_eq!(
        wolves,
        vec!["<im_start>user\nP1<im_end>\n<im_start>assistant\nR1<im_end>".to_string()]
    );
    let villagers = read_texts(&out.join("villager_dataset").join(DATA_FILE));
    assert_eq!(villagers.len(), 1);
    assert!(villagers[0].contains("I am the Villager, bid?"));
    assert!(villagers[0].contains("yes"));

    let info: JsonValue = serde_json::from_str(
        &fs::read_to_string(out.join("villager_dataset").join(INFO_FILE)).unwrap(),
    )
    .unwrap();
    assert_eq!(info["hub_repo_id"], "sft-villager-dataset");
}

#[test]
fn filtered_conversion_without_metadata_is_empty() {
    let tmp = tempdir().unwrap();
    let logs = tmp.path().join("logs");
    let out = tmp.path().join("out");
    two_game_logs(&logs);

    let summary = convert_logs(&ConvertOptions {
        logs_dir: logs,
        out_dir: out.clone(),
        filter_by_winner: true,
        overwrite: false,
    })
    .unwrap();
    assert_eq!(summary.scan.games_seen, 2);
    assert_eq!(summary.scan.games_used, 0);
    assert_eq!(summary.werewolf_examples, 0);
    assert_eq!(summary.villager_examples, 0);
    assert!(read_texts(&out.join("werewolf_dataset").join(DATA_FILE)).is_empty());
    assert!(read_texts(&out.join("villager_dataset").join(DATA_FILE)).is_empty());
}

#[test]
fn filtered_conversion_uses_metadata_winner() {
    let tmp = tempdir().unwrap();
    let logs = tmp.path().join("logs");
    let out = tmp.path().join("out");
    two_game_logs(&logs);
    // g1's own record says Werewolves, but the directory-level outcome wins.
    write(&logs.join("g1").join("game_partial.json"), r#"{"winner":"Villagers"}"#);
    write(&logs.join("g2").join("game_complete.json"), r#"{"winner":"Villagers"}"#);

    let summary = convert_logs(&ConvertOptions {
        logs_dir: logs,
        out_dir: out,
        filter_by_winner: true,
        overwrite: false,
    })
    .unwrap();
    assert_eq!(summary.scan.games_used, 2);
    assert_eq!(summary.werewolf_examples, 0);
    assert_eq!(summary.villager_examples, 1);
}

#[test]
fn rerun_requires_overwrite() {
    let tmp = tempdir().unwrap();
    let logs = tmp.path().join("logs");
    let out = tmp.path().join("out");
    two_game_logs(&logs);

    let mut opts = ConvertOptions {
        logs_dir: logs,
        out_dir: out,
        filter_by_winner: false,
        overwrite: false,
    };
    convert_logs(&opts).unwrap();
    assert!(convert_logs(&opts).is_err());
    opts.overwrite = true;
    assert_eq!(convert_logs(&opts).unwrap().werewolf_examples, 1);
}

#[test]
fn tally_counts_completed_games() {
    let tmp = tempdir().unwrap();
    write(&tmp.path().join("gA").join("game_complete.json"), r#"{"winner":"Villagers"}"#);
    write(&tmp.path().join("gB").join("game_complete.json"), r#"{"winner":"Werewolves"}"#);
    fs::create_dir_all(tmp.path().join("gC")).unwrap();

    assert_eq!(
        count_game_outcomes(tmp.path()).unwrap(),
        OutcomeTally {
            villager_wins: 1,
            werewolf_wins: 1,
            unresolved: 0,
        }
    );
}
