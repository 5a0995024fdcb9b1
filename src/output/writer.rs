// Record writer: render in memory, then commit all files or none

use crate::core::assembler::ExtractionRecord;
use crate::core::error::{Result, WaveformError};
use crate::output::csv::render_group_csv;
use crate::output::metadata::{render_metadata, MetadataFormat};
use crate::output::template::{resolve_template, sanitize_component};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct OutputFile {
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct RecordWriter {
    root: PathBuf,
    template: String,
    format: MetadataFormat,
}

impl RecordWriter {
    pub fn new<P: AsRef<Path>>(root: P, template: impl Into<String>, format: MetadataFormat) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            template: template.into(),
            format,
        }
    }

    /// Renders every file of `record` without touching the filesystem.
    /// `per_group` names the metadata file after the single group of a
    /// split record so sibling groups can share a directory.
    pub fn plan(&self, record: &ExtractionRecord, per_group: bool) -> Result<Vec<OutputFile>> {
        let dir = self.root.join(resolve_template(&self.template, &record.metadata)?);
        let stems = group_stems(record);

        let mut files = Vec::with_capacity(record.groups.len() + 1);
        for (group, stem) in record.groups.iter().zip(&stems) {
            files.push(OutputFile {
                path: dir.join(format!("{}.csv", stem)),
                contents: render_group_csv(group).into_bytes(),
            });
        }

        let metadata_name = match (per_group, stems.as_slice()) {
            (true, [stem]) => format!("{}_metadata.{}", stem, self.format.extension()),
            _ => format!("metadata.{}", self.format.extension()),
        };
        files.push(OutputFile {
            path: dir.join(metadata_name),
            contents: render_metadata(record, self.format)?,
        });

        Ok(files)
    }

    pub async fn write(&self, record: &ExtractionRecord, per_group: bool) -> Result<Vec<PathBuf>> {
        let files = self.plan(record, per_group)?;
        commit(&files).await?;
        Ok(files.into_iter().map(|f| f.path).collect())
    }
}

/// File stem per group: the label when unique, `{label}_{index}` when
/// repeated, `group_{index}` when empty.
pub fn group_stems(record: &ExtractionRecord) -> Vec<String> {
    let labels: Vec<String> = record
        .groups
        .iter()
        .map(|g| sanitize_component(g.label.trim()))
        .collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for label in &labels {
        *counts.entry(label.as_str()).or_default() += 1;
    }

    record
        .groups
        .iter()
        .zip(&labels)
        .map(|(group, label)| {
            if label.is_empty() || label == "." || label == ".." {
                format!("group_{}", group.index)
            } else if counts[label.as_str()] > 1 {
                format!("{}_{}", label, group.index)
            } else {
                label.clone()
            }
        })
        .collect()
}

fn partial_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.partial", name))
}

fn write_error(path: &Path, e: std::io::Error) -> WaveformError {
    WaveformError::OutputWrite(format!("{}: {}", path.display(), e))
}

async fn remove_partials(partials: &[PathBuf]) {
    for partial in partials {
        if let Err(e) = tokio::fs::remove_file(partial).await {
            warn!("could not remove {}: {}", partial.display(), e);
        }
    }
}

/// Stages every file as a hidden `.partial` sibling, then renames them
/// into place. On failure the staged files are removed.
pub async fn commit(files: &[OutputFile]) -> Result<()> {
    let mut staged: Vec<PathBuf> = Vec::with_capacity(files.len());

    for file in files {
        if let Some(parent) = file.path.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                remove_partials(&staged).await;
                return Err(write_error(parent, e));
            }
        }
        let partial = partial_path(&file.path);
        if let Err(e) = tokio::fs::write(&partial, &file.contents).await {
            remove_partials(&staged).await;
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(write_error(&file.path, e));
        }
        staged.push(partial);
    }

    for (i, (partial, file)) in staged.iter().zip(files).enumerate() {
        if let Err(e) = tokio::fs::rename(partial, &file.path).await {
            remove_partials(&staged[i..]).await;
            return Err(write_error(&file.path, e));
        }
        debug!("wrote {}", file.path.display());
    }

    Ok(())
}
