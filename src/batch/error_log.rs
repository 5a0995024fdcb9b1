use chrono::Local;
use dcm_waveform::Issue;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Append-only run log. One line per failure, writes serialized.
pub struct ErrorLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl ErrorLog {
    pub async fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path).await?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, source: &Path, issue: &Issue) -> io::Result<()> {
        let line = format_entry(&Local::now().format("%Y-%m-%d %H:%M:%S,%3f").to_string(), source, issue);
        let mut file = self.file.lock().await;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
}

pub fn format_entry(timestamp: &str, source: &Path, issue: &Issue) -> String {
    format!("{} - ERROR - {} {}\n", timestamp, source.display(), issue)
}
