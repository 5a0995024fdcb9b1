use regex::Regex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// A shell wildcard (`*`, `?`) matched against the whole file name.
#[derive(Debug, Clone)]
pub struct FileMask {
    regex: Regex,
}

impl FileMask {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let mut source = String::with_capacity(pattern.len() + 8);
        source.push('^');
        for c in pattern.chars() {
            match c {
                '*' => source.push_str(".*"),
                '?' => source.push('.'),
                other => source.push_str(&regex::escape(&other.to_string())),
            }
        }
        source.push('$');

        Ok(Self {
            regex: Regex::new(&source)?,
        })
    }

    pub fn matches(&self, file_name: &str) -> bool {
        self.regex.is_match(file_name)
    }
}

pub fn compile_masks(patterns: &[String]) -> Result<Vec<FileMask>, regex::Error> {
    patterns.iter().map(|p| FileMask::new(p)).collect()
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Files under `input_dir` matching any mask, sorted and de-duplicated.
/// Hidden entries are skipped, as is anything under `exclude`.
pub fn discover(
    input_dir: &Path,
    masks: &[FileMask],
    recursive: bool,
    exclude: Option<&Path>,
) -> Vec<PathBuf> {
    let exclude = exclude.and_then(|p| p.canonicalize().ok());
    let max_depth = if recursive { usize::MAX } else { 1 };

    let walker = WalkDir::new(input_dir)
        .max_depth(max_depth)
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 {
                return true;
            }
            if is_hidden(&entry.file_name().to_string_lossy()) {
                return false;
            }
            match (&exclude, entry.path().canonicalize()) {
                (Some(excluded), Ok(path)) => !path.starts_with(excluded),
                _ => true,
            }
        });

    let mut found = BTreeSet::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if masks.iter().any(|mask| mask.matches(&name)) {
            found.insert(entry.into_path());
        }
    }

    debug!("Discovered {} files under {}", found.len(), input_dir.display());
    found.into_iter().collect()
}
