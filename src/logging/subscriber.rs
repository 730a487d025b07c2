//! Tracing subscriber setup: console formatter, file layer, and initialisation.
use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::filter::LevelFilter;

use super::types::Verbosity;
use super::utils::{format_timestamp, strip_ansi};

/// Target used for stage headers.
pub(super) const STAGE_TARGET: &str = "devstrap::stage";
/// Target used for dry-run action messages.
pub(super) const DRY_RUN_TARGET: &str = "devstrap::dry_run";
/// Target used for run summary lines; shown on the console even when quiet.
pub(super) const SUMMARY_TARGET: &str = "devstrap::summary";

/// Extracts the `message` field from a [`tracing::Event`].
#[derive(Default)]
struct MessageExtractor {
    message: String,
}

impl tracing::field::Visit for MessageExtractor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}

/// Render one log file line: `[<timestamp>] [<LEVEL>] <message>`.
fn file_line(ts: &str, level: tracing::Level, target: &str, msg: &str) -> String {
    let (label, body) = match (level, target) {
        (tracing::Level::INFO, STAGE_TARGET) => ("INFO", format!("==> {msg}")),
        (tracing::Level::INFO, DRY_RUN_TARGET) => ("DRY-RUN", msg.to_string()),
        (tracing::Level::ERROR, _) => ("ERROR", msg.to_string()),
        (tracing::Level::WARN, _) => ("WARN", msg.to_string()),
        (tracing::Level::INFO, _) => ("INFO", msg.to_string()),
        _ => ("DEBUG", msg.to_string()),
    };
    format!("[{ts}] [{label}] {body}")
}

/// A [`tracing_subscriber::Layer`] that appends every event to the run log.
///
/// The file is opened in append mode so history from earlier runs is kept.
/// Always captures events at `DEBUG` level and above regardless of the
/// console verbosity.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Open (or create) the log file at `path`, append a run header, and
    /// return a layer ready to receive events.
    ///
    /// Returns `None` if the parent directory cannot be created or the file
    /// cannot be opened.
    pub(super) fn new(path: &Path, command: &str) -> Option<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).ok()?;
        }
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()?;
        let version =
            option_env!("DEVSTRAP_VERSION").unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")));
        writeln!(
            file,
            "[{}] [INFO] ==== devstrap {version} ({command}) ====",
            format_timestamp()
        )
        .ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let metadata = event.metadata();
        let mut extractor = MessageExtractor::default();
        event.record(&mut extractor);
        let line = file_line(
            &format_timestamp(),
            *metadata.level(),
            metadata.target(),
            &strip_ansi(&extractor.message),
        );

        if let Ok(mut f) = self.file.lock() {
            writeln!(f, "{line}").ok();
        }
    }
}

/// A [`tracing_subscriber::fmt::FormatEvent`] for devstrap console output.
struct ConsoleFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ConsoleFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let level = *metadata.level();
        let target = metadata.target();

        let mut extractor = MessageExtractor::default();
        event.record(&mut extractor);
        let msg = &extractor.message;

        match level {
            tracing::Level::ERROR => writeln!(writer, "\x1b[31mERROR\x1b[0m {msg}"),
            tracing::Level::WARN => writeln!(writer, "\x1b[33mWARN\x1b[0m  {msg}"),
            tracing::Level::INFO if target == STAGE_TARGET => {
                writeln!(writer, "\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m")
            }
            tracing::Level::INFO if target == DRY_RUN_TARGET => {
                writeln!(writer, "  \x1b[33m[DRY RUN]\x1b[0m {msg}")
            }
            tracing::Level::INFO => writeln!(writer, "  {msg}"),
            _ => writeln!(writer, "  \x1b[2m{msg}\x1b[0m"),
        }
    }
}

/// Whether the console shows an event at `level` from `target` when the
/// verbosity allows up to `max`.
fn console_allows(level: tracing::Level, target: &str, max: LevelFilter) -> bool {
    target == SUMMARY_TARGET || level <= max
}

/// Initialise the global [`tracing`] subscriber.
///
/// The console layer honours `verbosity`, except for summary lines which are
/// always shown; warnings and errors go to stderr,
/// everything else to stdout. When `log_path` is given, a file layer appends
/// every event at debug level and above. A log file that cannot be opened
/// is not an error: the run continues with console output only.
///
/// Must be called once at program startup, before any logging.
pub fn init_subscriber(verbosity: Verbosity, log_path: Option<&Path>, command: &str) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        Layer as _,
        filter::filter_fn,
        fmt,
        layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_level = match verbosity {
        Verbosity::Quiet => LevelFilter::WARN,
        Verbosity::Normal => LevelFilter::INFO,
        Verbosity::Verbose => LevelFilter::DEBUG,
    };

    let make_writer = std::io::stderr
        .with_max_level(tracing::Level::WARN)
        .and(std::io::stdout.with_min_level(tracing::Level::INFO));

    let console_layer = fmt::layer()
        .event_format(ConsoleFormatter)
        .with_writer(make_writer)
        .with_filter(filter_fn(move |metadata| {
            console_allows(*metadata.level(), metadata.target(), console_level)
        }));

    let file_layer = log_path
        .and_then(|p| FileLayer::new(p, command))
        .map(|l| l.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}
