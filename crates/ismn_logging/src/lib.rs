//! Logging setup for the ISMN adaptor binaries.
//!
//! Events go to stderr and to a size-rotated file under
//! `~/.ismn_adaptor/logs/<app>.log`. `RUST_LOG` overrides the default filter.
//! The log file and its directory are only created once an event passes the
//! file filter, so a run that logs nothing leaves the disk untouched.

use anyhow::{anyhow, Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Environment variable that relocates the adaptor home directory.
pub const HOME_ENV: &str = "ISMN_ADAPTOR_HOME";

const DEFAULT_LOG_FILTER: &str = "ismn_adaptor=info,ismn_logging=info";
const VERBOSE_LOG_FILTER: &str = "ismn_adaptor=debug,ismn_logging=debug";
const QUIET_LOG_FILTER: &str = "warn";
const MAX_LOG_FILES: usize = 5;
const MAX_LOG_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Logging options chosen on the command line.
pub struct LogConfig<'a> {
    pub app_name: &'a str,
    pub verbose: bool,
    pub quiet: bool,
}

/// Install the global subscriber.
///
/// Without a usable home directory only stderr logging is installed.
pub fn init_logging(config: LogConfig<'_>) -> Result<()> {
    let file_layer = match logs_dir() {
        Ok(dir) => Some(
            tracing_subscriber::fmt::layer()
                .with_writer(SharedRotatingWriter::new(dir, config.app_name))
                .with_ansi(false)
                .with_filter(base_filter()),
        ),
        Err(err) => {
            eprintln!("Warning: file logging disabled: {:#}", err);
            None
        }
    };

    let console_filter = if config.quiet {
        EnvFilter::new(QUIET_LOG_FILTER)
    } else if config.verbose {
        EnvFilter::new(VERBOSE_LOG_FILTER)
    } else {
        base_filter()
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(console_filter),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}

fn base_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// The adaptor home directory: `$ISMN_ADAPTOR_HOME` or `~/.ismn_adaptor`.
pub fn adaptor_home() -> Result<PathBuf> {
    if let Some(override_path) = std::env::var_os(HOME_ENV) {
        return Ok(PathBuf::from(override_path));
    }
    dirs::home_dir()
        .map(|home| home.join(".ismn_adaptor"))
        .ok_or_else(|| anyhow!("Could not determine home directory; set {}", HOME_ENV))
}

/// The logs directory: `<home>/logs`
pub fn logs_dir() -> Result<PathBuf> {
    Ok(adaptor_home()?.join("logs"))
}

/// Size-capped log file, opened on first write.
///
/// When a write would push `<base>.log` past `max_size`, older files shift
/// up one slot (`<base>.log.1`, `.2`, ...) and at most `max_files` files,
/// the live one included, are kept.
struct RotatingLog {
    dir: PathBuf,
    base_name: String,
    max_files: usize,
    max_size: u64,
    file: Option<File>,
    written: u64,
}

impl RotatingLog {
    fn new(dir: &Path, app_name: &str, max_files: usize, max_size: u64) -> Self {
        let base_name = app_name
            .chars()
            .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' { ch } else { '_' })
            .collect();
        Self {
            dir: dir.to_path_buf(),
            base_name,
            max_files: max_files.max(1),
            max_size,
            file: None,
            written: 0,
        }
    }

    fn live_path(&self) -> PathBuf {
        self.dir.join(format!("{}.log", self.base_name))
    }

    fn slot_path(&self, slot: usize) -> PathBuf {
        self.dir.join(format!("{}.log.{}", self.base_name, slot))
    }

    fn open_live(&mut self) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.live_path())?;
        self.written = file.metadata()?.len();
        self.file = Some(file);
        Ok(())
    }

    fn shift_slots(&mut self) -> io::Result<()> {
        if let Some(mut file) = self.file.take() {
            let _ = file.flush();
        }

        let slots = self.max_files - 1;
        if slots == 0 {
            remove_if_present(&self.live_path())?;
        } else {
            remove_if_present(&self.slot_path(slots))?;
            for slot in (1..slots).rev() {
                let from = self.slot_path(slot);
                if from.exists() {
                    fs::rename(&from, self.slot_path(slot + 1))?;
                }
            }
            let live = self.live_path();
            if live.exists() {
                fs::rename(&live, self.slot_path(1))?;
            }
        }

        self.open_live()
    }
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}

impl Write for RotatingLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.file.is_none() {
            self.open_live()?;
        }
        if self.written > 0 && self.written + buf.len() as u64 > self.max_size {
            self.shift_slots()?;
        }

        let file = self
            .file
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "log file unavailable"))?;
        let bytes = file.write(buf)?;
        self.written += bytes as u64;
        Ok(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

/// Cloneable handle so every formatted event shares one [`RotatingLog`].
#[derive(Clone)]
struct SharedRotatingWriter(Arc<Mutex<RotatingLog>>);

impl SharedRotatingWriter {
    fn new(dir: PathBuf, app_name: &str) -> Self {
        let log = RotatingLog::new(&dir, app_name, MAX_LOG_FILES, MAX_LOG_FILE_SIZE);
        Self(Arc::new(Mutex::new(log)))
    }

    fn with_log<T>(&self, f: impl FnOnce(&mut RotatingLog) -> io::Result<T>) -> io::Result<T> {
        let mut log = self
            .0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?;
        f(&mut log)
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SharedRotatingWriter {
    type Writer = SharedRotatingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

impl Write for SharedRotatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.with_log(|log| log.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.with_log(|log| log.flush())
    }
}
