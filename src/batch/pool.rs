use anyhow::{Context, Result};
use dcm_waveform::core::assembler::split_groups;
use dcm_waveform::output::writer::{commit, OutputFile};
use dcm_waveform::{extract, DicomReader, Extraction, Issue, RecordWriter, WaveformError};
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

use crate::batch::discovery::{compile_masks, discover};
use crate::models::config_model::ExtractorConfig;
use crate::state::app_state::{AppState, RunSummary};

/// Everything a file produced before anything touched the output tree.
struct Prepared {
    issues: Vec<Issue>,
    files: Vec<OutputFile>,
}

/// Parse, extract and render one container. CPU-bound; runs off the async workers.
fn prepare(bytes: &[u8], writer: &RecordWriter, split: bool) -> Prepared {
    let file = match DicomReader::from_bytes(bytes) {
        Ok(file) => file,
        Err(e) => {
            return Prepared {
                issues: vec![Issue::file(e)],
                files: Vec::new(),
            }
        }
    };

    let Extraction { record, mut issues } = extract(file.dataset());
    let records = if split { split_groups(record) } else { vec![record] };

    let mut files = Vec::new();
    for record in &records {
        match writer.plan(record, split) {
            Ok(planned) => files.extend(planned),
            Err(e) => {
                issues.push(Issue::file(e));
                files.clear();
                break;
            }
        }
    }

    Prepared { issues, files }
}

/// Runs one file through the pipeline and logs every issue it raised.
/// Returns true when the file's outputs were written.
pub async fn process_file(path: &Path, writer: Arc<RecordWriter>, split: bool, state: &AppState) -> bool {
    state.stats.processed.fetch_add(1, Ordering::Relaxed);
    debug!("Processing {}", path.display());

    let prepared = match tokio::fs::read(path).await {
        Ok(bytes) => {
            let writer = writer.clone();
            match tokio::task::spawn_blocking(move || prepare(&bytes, &writer, split)).await {
                Ok(prepared) => prepared,
                Err(e) => Prepared {
                    issues: vec![Issue::file(WaveformError::CorruptedData(format!(
                        "decoder task failed: {}",
                        e
                    )))],
                    files: Vec::new(),
                },
            }
        }
        Err(e) => Prepared {
            issues: vec![Issue::file(WaveformError::Io(e))],
            files: Vec::new(),
        },
    };

    let Prepared { mut issues, files } = prepared;
    let fatal_before_write = issues.iter().any(|i| i.kind().is_file_fatal());

    let mut written = false;
    if !fatal_before_write {
        match commit(&files).await {
            Ok(()) => {
                written = true;
                info!("Processed {} -> {} files", path.display(), files.len());
            }
            Err(e) => issues.push(Issue::file(e)),
        }
    }

    for issue in &issues {
        if issue.kind().is_file_fatal() {
            error!("{}: {}", path.display(), issue);
        } else {
            warn!("{}: {}", path.display(), issue);
        }
        if let Err(e) = state.error_log.append(path, issue).await {
            error!("Cannot write to {}: {}", state.error_log.path().display(), e);
        }
    }

    if written {
        state.stats.written.fetch_add(1, Ordering::Relaxed);
    } else {
        state.stats.failed.fetch_add(1, Ordering::Relaxed);
    }
    written
}

async fn worker(
    id: usize,
    queue: Arc<Mutex<mpsc::Receiver<PathBuf>>>,
    writer: Arc<RecordWriter>,
    split: bool,
    state: AppState,
) {
    loop {
        if state.should_stop() {
            debug!("Worker {} stopping", id);
            break;
        }
        let next = queue.lock().await.recv().await;
        let Some(path) = next else { break };
        process_file(&path, writer.clone(), split, &state).await;
    }
}

/// Feeds every discovered file to a fixed pool of workers and waits for them.
pub async fn run(config: &ExtractorConfig, state: AppState) -> Result<RunSummary> {
    let masks = compile_masks(&config.file_format_mask).context("Invalid file_format_mask")?;

    let input_dir = config.input_dir.clone();
    let output_dir = config.output_dir.clone();
    let recursive = config.recursive;
    let files = tokio::task::spawn_blocking(move || {
        discover(&input_dir, &masks, recursive, Some(&output_dir))
    })
    .await
    .context("File discovery failed")?;

    let workers = config.effective_workers().min(files.len().max(1));
    info!(
        "Found {} files in {}, starting {} workers",
        files.len(),
        config.input_dir.display(),
        workers
    );

    let writer = Arc::new(RecordWriter::new(
        &config.output_dir,
        config.output_structure.clone(),
        config.metadata_format,
    ));

    let (tx, rx) = mpsc::channel::<PathBuf>(workers * 2);
    let queue = Arc::new(Mutex::new(rx));

    let handles: Vec<_> = (0..workers)
        .map(|id| {
            tokio::spawn(worker(
                id,
                queue.clone(),
                writer.clone(),
                config.split_groups,
                state.clone(),
            ))
        })
        .collect();

    for path in files {
        if state.should_stop() {
            info!("Stop requested, no further files will be queued");
            break;
        }
        if tx.send(path).await.is_err() {
            break;
        }
    }
    drop(tx);

    for handle in handles {
        if let Err(e) = handle.await {
            error!("Worker task failed: {}", e);
        }
    }

    Ok(state.stats.snapshot())
}
