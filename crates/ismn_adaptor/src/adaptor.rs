//! Locating a network and adapting its files one at a time.

use crate::config::AdaptorConfig;
use crate::error::{AdaptorError, Result};
use crate::scanner::candidate_files;
use crate::tokens::{canonical_file_name, canonical_header, FILENAME_TOKEN, HEADER_TOKEN};
use indicatif::ProgressBar;
use serde::Serialize;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A network directory that was confirmed to exist.
///
/// Only [`Adaptor::locate_network`] hands these out, so holding one means the
/// precondition for enumeration and adaptation has been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkDir {
    path: PathBuf,
}

impl NetworkDir {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Where the requested network was expected but not found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingNetwork {
    pub pattern: String,
    pub database: String,
    pub database_path: PathBuf,
}

/// Result of looking for `<root>/<database>/<pattern>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkLocation {
    Found(NetworkDir),
    NotFound(MissingNetwork),
}

/// Why a candidate file was left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    FilenameTokenMissing,
    HeaderTokenMissing,
    EmptyFile,
    TargetExists { target: PathBuf },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::FilenameTokenMissing => {
                write!(f, "file name does not contain \"{}\"", FILENAME_TOKEN)
            }
            SkipReason::HeaderTokenMissing => {
                write!(f, "first line does not contain \"{}\"", HEADER_TOKEN)
            }
            SkipReason::EmptyFile => write!(f, "file has no header line"),
            SkipReason::TargetExists { target } => {
                write!(f, "{} already exists", target.display())
            }
        }
    }
}

/// What happened to a single candidate file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AdaptOutcome {
    /// New file written, original removed.
    Adapted { source: PathBuf, target: PathBuf },
    /// Dry run: the file would have been adapted.
    Planned { source: PathBuf, target: PathBuf },
    /// Left untouched.
    Skipped { path: PathBuf, reason: SkipReason },
}

/// Summary of one pass over a network directory.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AdaptReport {
    pub network_dir: PathBuf,
    pub total: usize,
    pub outcomes: Vec<AdaptOutcome>,
}

impl AdaptReport {
    pub fn adapted(&self) -> usize {
        self.count(|o| matches!(o, AdaptOutcome::Adapted { .. }))
    }

    pub fn planned(&self) -> usize {
        self.count(|o| matches!(o, AdaptOutcome::Planned { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, AdaptOutcome::Skipped { .. }))
    }

    fn count(&self, pred: impl Fn(&AdaptOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }
}

/// A rewrite computed in memory, before anything touches the disk.
struct Rewrite {
    target: PathBuf,
    contents: String,
}

enum Prepared {
    Ready(Rewrite),
    Skip(SkipReason),
}

/// Adapts the files of one network inside an ISMN database.
#[derive(Debug, Clone)]
pub struct Adaptor {
    root: PathBuf,
    database: String,
    config: AdaptorConfig,
    dry_run: bool,
}

impl Adaptor {
    /// `root` is the directory holding the database folder named `database`.
    pub fn new(root: impl Into<PathBuf>, database: impl Into<String>, config: AdaptorConfig) -> Self {
        Self {
            root: root.into(),
            database: database.into(),
            config,
            dry_run: false,
        }
    }

    /// Compute outcomes without writing or removing anything.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn config(&self) -> &AdaptorConfig {
        &self.config
    }

    pub fn database_path(&self) -> PathBuf {
        self.root.join(&self.database)
    }

    /// Check that the configured network exists inside the database.
    pub fn locate_network(&self) -> NetworkLocation {
        let database_path = self.database_path();
        let candidate = database_path.join(&self.config.pattern);
        if candidate.is_dir() {
            let path = candidate.canonicalize().unwrap_or(candidate);
            debug!(network_dir = %path.display(), "Located network");
            NetworkLocation::Found(NetworkDir { path })
        } else {
            NetworkLocation::NotFound(MissingNetwork {
                pattern: self.config.pattern.clone(),
                database: self.database.clone(),
                database_path,
            })
        }
    }

    /// All candidate files of a located network, in enumeration order.
    pub fn candidate_files(&self, network: &NetworkDir) -> Vec<PathBuf> {
        candidate_files(network.path(), &self.config)
    }

    /// Adapt every candidate file of `network`, advancing `progress` per file.
    ///
    /// Format mismatches are reported and skipped. Any I/O failure aborts the
    /// pass; files handled before it stay adapted.
    pub fn adapt_files(&self, network: &NetworkDir, progress: &ProgressBar) -> Result<AdaptReport> {
        let files = self.candidate_files(network);
        progress.set_length(files.len() as u64);
        info!(
            network_dir = %network.path().display(),
            candidates = files.len(),
            dry_run = self.dry_run,
            "Adapting files"
        );

        let mut report = AdaptReport {
            network_dir: network.path().to_path_buf(),
            total: files.len(),
            outcomes: Vec::with_capacity(files.len()),
        };

        for path in &files {
            let outcome = self.adapt_file(path)?;
            match &outcome {
                AdaptOutcome::Adapted { source, target } => {
                    debug!(source = %source.display(), target = %target.display(), "Adapted");
                }
                AdaptOutcome::Planned { source, target } => {
                    progress.suspend(|| {
                        info!(source = %source.display(), target = %target.display(), "Would adapt");
                    });
                }
                AdaptOutcome::Skipped { path, reason } => {
                    progress.suspend(|| {
                        warn!(
                            file = %path.display(),
                            reason = %reason,
                            "Adaptations were not applied; they may already be implemented"
                        );
                    });
                }
            }
            report.outcomes.push(outcome);
            progress.inc(1);
        }

        Ok(report)
    }

    /// Rename one file and rewrite its header, then remove the original.
    pub fn adapt_file(&self, path: &Path) -> Result<AdaptOutcome> {
        let rewrite = match prepare_rewrite(path)? {
            Prepared::Ready(rewrite) => rewrite,
            Prepared::Skip(reason) => return Ok(skipped(path, reason)),
        };

        if self.dry_run {
            return Ok(AdaptOutcome::Planned {
                source: path.to_path_buf(),
                target: rewrite.target,
            });
        }

        let file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&rewrite.target)
        {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                return Ok(skipped(path, SkipReason::TargetExists { target: rewrite.target }));
            }
            Err(source) => {
                return Err(AdaptorError::Write {
                    path: rewrite.target,
                    source,
                })
            }
        };

        if let Err(source) = write_all_synced(file, &rewrite.contents) {
            // Do not leave a truncated file that a rerun would refuse to overwrite.
            let _ = fs::remove_file(&rewrite.target);
            return Err(AdaptorError::Write {
                path: rewrite.target,
                source,
            });
        }

        fs::remove_file(path).map_err(|source| AdaptorError::Remove {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(AdaptOutcome::Adapted {
            source: path.to_path_buf(),
            target: rewrite.target,
        })
    }
}

fn skipped(path: &Path, reason: SkipReason) -> AdaptOutcome {
    AdaptOutcome::Skipped {
        path: path.to_path_buf(),
        reason,
    }
}

/// Validate name and header and build the new contents, without writing.
fn prepare_rewrite(path: &Path) -> Result<Prepared> {
    let target_name = match path
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(canonical_file_name)
    {
        Some(name) => name,
        None => return Ok(Prepared::Skip(SkipReason::FilenameTokenMissing)),
    };

    let target = path.with_file_name(target_name);
    if target.exists() {
        return Ok(Prepared::Skip(SkipReason::TargetExists { target }));
    }

    let contents = fs::read_to_string(path).map_err(|source| AdaptorError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if contents.is_empty() {
        return Ok(Prepared::Skip(SkipReason::EmptyFile));
    }

    let (header, body) = contents.split_at(header_end(&contents));
    let header = match canonical_header(header) {
        Some(header) => header,
        None => return Ok(Prepared::Skip(SkipReason::HeaderTokenMissing)),
    };

    let mut rewritten = String::with_capacity(header.len() + body.len());
    rewritten.push_str(&header);
    rewritten.push_str(body);

    Ok(Prepared::Ready(Rewrite {
        target,
        contents: rewritten,
    }))
}

/// Byte offset just past the first line break: `\n`, `\r\n` or a lone `\r`.
fn header_end(contents: &str) -> usize {
    match contents.find(['\n', '\r']) {
        Some(i) if contents[i..].starts_with("\r\n") => i + 2,
        Some(i) => i + 1,
        None => contents.len(),
    }
}

fn write_all_synced(file: fs::File, contents: &str) -> io::Result<()> {
    let mut writer = BufWriter::new(file);
    writer.write_all(contents.as_bytes())?;
    let file = writer.into_inner().map_err(|err| err.into_error())?;
    file.sync_all()
}
