//! Persistence of extracted examples as on-disk text datasets.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use log::info;
use serde::Serialize;

use crate::extract::Example;

/// The two datasets a conversion run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetKind {
    Werewolf,
    Villager,
}

impl DatasetKind {
    /// Subdirectory of the output dir holding this dataset.
    pub fn dir_name(self) -> &'static str {
        match self {
            DatasetKind::Werewolf => "werewolf_dataset",
            DatasetKind::Villager => "villager_dataset",
        }
    }

    /// Hub repository id for this dataset given the output dir's base name.
    pub fn hub_repo_id(self, repo_base: &str) -> String {
        let suffix = match self {
            DatasetKind::Werewolf => "werewolf-dataset",
            DatasetKind::Villager => "villager-dataset",
        };
        format!("{repo_base}-{suffix}")
    }

    pub fn label(self) -> &'static str {
        match self {
            DatasetKind::Werewolf => "werewolf",
            DatasetKind::Villager => "villager",
        }
    }
}

/// Destination for an ordered sequence of text records.
pub trait DatasetSink {
    /// Store `examples` as dataset `kind`, returning how many rows were written.
    fn write_examples(&mut self, kind: DatasetKind, examples: &[Example]) -> Result<usize>;
}

/// Writes `<out_dir>/<kind>/data.jsonl` plus a `dataset_info.json` sidecar.
#[derive(Debug, Clone)]
pub struct DiskDatasetSink {
    out_dir: PathBuf,
    repo_base: String,
    overwrite: bool,
}

#[derive(Debug, Serialize)]
struct DatasetInfo<'a> {
    name: &'a str,
    num_rows: usize,
    features: Features,
    hub_repo_id: String,
}

#[derive(Debug, Serialize)]
struct Features {
    text: &'static str,
}

pub const DATA_FILE: &str = "data.jsonl";
pub const INFO_FILE: &str = "dataset_info.json";

impl DiskDatasetSink {
    pub fn new(out_dir: &Path, overwrite: bool) -> Result<Self> {
        fs::create_dir_all(out_dir)
            .with_context(|| format!("failed to create output dir {}", out_dir.display()))?;
        if !overwrite {
            for kind in [DatasetKind::Werewolf, DatasetKind::Villager] {
                let dir = out_dir.join(kind.dir_name());
                if dir.exists() {
                    bail!("dataset {} already exists (use --overwrite)", dir.display());
                }
            }
        }
        Ok(Self {
            out_dir: out_dir.to_path_buf(),
            repo_base: hub_repo_base(out_dir)?,
            overwrite,
        })
    }

    pub fn dataset_dir(&self, kind: DatasetKind) -> PathBuf {
        self.out_dir.join(kind.dir_name())
    }

    pub fn hub_repo_id(&self, kind: DatasetKind) -> String {
        kind.hub_repo_id(&self.repo_base)
    }

    fn prepare_dir(&self, dir: &Path) -> Result<()> {
        if dir.exists() {
            if self.overwrite {
                fs::remove_dir_all(dir)
                    .with_context(|| format!("failed to remove {}", dir.display()))?;
            } else {
                bail!("dataset {} already exists (use --overwrite)", dir.display());
            }
        }
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))
    }
}

impl DatasetSink for DiskDatasetSink {
    fn write_examples(&mut self, kind: DatasetKind, examples: &[Example]) -> Result<usize> {
        let dir = self.dataset_dir(kind);
        self.prepare_dir(&dir)?;

        write_jsonl(examples, &dir.join(DATA_FILE))?;

        let info = DatasetInfo {
            name: kind.dir_name(),
            num_rows: examples.len(),
            features: Features { text: "string" },
            hub_repo_id: self.hub_repo_id(kind),
        };
        let info_path = dir.join(INFO_FILE);
        let mut file = File::create(&info_path)
            .with_context(|| format!("failed to create {}", info_path.display()))?;
        let json = serde_json::to_string_pretty(&info)?;
        file.write_all(json.as_bytes())?;
        file.write_all(b"\n")?;

        info!("Wrote {} {} examples to {}", examples.len(), kind.label(), dir.display());
        Ok(examples.len())
    }
}

/// Base name of `out_dir` once made absolute, e.g. `runs/v2/` -> `v2`.
pub fn hub_repo_base(out_dir: &Path) -> Result<String> {
    let absolute = std::path::absolute(out_dir)
        .with_context(|| format!("failed to resolve {}", out_dir.display()))?;
    match absolute.file_name() {
        Some(name) => Ok(name.to_string_lossy().into_owned()),
        None => bail!("cannot derive a dataset name from {}", absolute.display()),
    }
}

/// Write one JSON object per line via a temp file renamed into place.
fn write_jsonl(examples: &[Example], out_path: &Path) -> Result<()> {
    let tmp = out_path.with_extension("jsonl.tmp");
    let file = File::create(&tmp).with_context(|| format!("failed to create {}", tmp.display()))?;
    let mut writer = BufWriter::new(file);
    for example in examples {
        serde_json::to_writer(&mut writer, example)?;
        writer.write_all(b"\n")?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to flush {}", tmp.display()))?;
    fs::rename(&tmp, out_path).with_context(|| {
        format!(
            "failed to rename {} -> {}",
            tmp.display(),
            out_path.display()
        )
    })?;
    Ok(())
}
