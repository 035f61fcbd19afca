use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::Layered;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

type Filtered = Layered<EnvFilter, Registry>;
type BoxedLayer = Box<dyn Layer<Filtered> + Send + Sync>;

/// Keeps the non-blocking writers flushing until dropped.
#[derive(Default)]
pub struct LogGuard {
    workers: Vec<WorkerGuard>,
    file: Option<PathBuf>,
}

impl LogGuard {
    #[must_use]
    pub const fn log_file(&self) -> Option<&PathBuf> {
        self.file.as_ref()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.workers.is_empty()
    }
}

/// Installs the global subscriber.
///
/// `verbose` sends human readable logs to stderr. With the `debug-log`
/// feature a JSON log is also appended to `chatstream-debug.log`.
#[must_use]
pub fn init(verbose: bool) -> LogGuard {
    let mut guard = LogGuard::default();
    let mut layers: Vec<BoxedLayer> = Vec::new();

    if verbose {
        let (writer, worker) = tracing_appender::non_blocking(std::io::stderr());
        guard.workers.push(worker);
        layers.push(
            fmt::layer()
                .with_writer(writer)
                .with_target(false)
                .compact()
                .boxed(),
        );
    }

    if let Some((path, layer, worker)) = inner::file_layer() {
        guard.workers.push(worker);
        guard.file = Some(path);
        layers.push(layer);
    }

    if layers.is_empty() {
        return guard;
    }

    let default_level = if guard.file.is_some() { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::registry().with(filter).with(layers);

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Failed to set tracing subscriber");
        return LogGuard::default();
    }

    tracing::debug!(log_file = ?guard.file, "Logging initialized");
    guard
}

#[cfg(feature = "debug-log")]
mod inner {
    use super::{BoxedLayer, PathBuf, WorkerGuard};
    use std::fs;
    use tracing_subscriber::{Layer, fmt};

    pub fn file_layer() -> Option<(PathBuf, BoxedLayer, WorkerGuard)> {
        let log_path = PathBuf::from("chatstream-debug.log");

        let file = match fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
        {
            Ok(f) => f,
            Err(e) => {
                eprintln!("Failed to open log file: {e}");
                return None;
            }
        };

        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = fmt::layer()
            .json()
            .with_writer(non_blocking)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed();

        Some((log_path, layer, guard))
    }
}

#[cfg(not(feature = "debug-log"))]
mod inner {
    use super::{BoxedLayer, PathBuf, WorkerGuard};

    #[inline(always)]
    pub fn file_layer() -> Option<(PathBuf, BoxedLayer, WorkerGuard)> {
        None
    }
}
