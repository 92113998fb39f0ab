//! Candidate file discovery below a network directory.

use crate::config::AdaptorConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Shallowest depth a candidate may live at: `<network>/<station>/<file>`.
const STATION_DEPTH: usize = 2;

/// List every candidate file below `network_dir`.
///
/// Files sitting directly in the network directory are ignored; candidates
/// live inside a station folder at any depth. Entries the walker cannot read
/// are logged and skipped. The order is whatever the filesystem yields.
pub fn candidate_files(network_dir: &Path, config: &AdaptorConfig) -> Vec<PathBuf> {
    let suffix = config.suffix();
    let include_hidden = config.include_hidden;

    let walker = WalkDir::new(network_dir)
        .min_depth(1)
        .follow_links(config.follow_symlinks)
        .into_iter()
        .filter_entry(move |entry| entry.depth() == 0 || include_hidden || !is_hidden(entry));

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(error = %err, "Skipping unreadable entry");
                continue;
            }
        };

        if entry.depth() < STATION_DEPTH || !entry.file_type().is_file() {
            continue;
        }

        let matches = entry
            .file_name()
            .to_str()
            .map_or(false, |name| name.ends_with(&suffix));
        if matches {
            files.push(entry.into_path());
        }
    }

    debug!(
        network_dir = %network_dir.display(),
        count = files.len(),
        "Enumerated candidate files"
    );
    files
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map_or(false, |name| name.starts_with('.'))
}
