//! Console logging for hosts embedding safeline.
//!
//! Library code only emits `tracing` events. Hosts that have no subscriber of
//! their own call [`install_tracing`] once at startup.

use std::io::{self, Write};
use std::str::FromStr;
use std::sync::{Mutex, Once, OnceLock};

use tracing::Level;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::writer::MakeWriter;
use tracing_subscriber::fmt::{self, FormatEvent, FormatFields};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, filter};

const TRACING_PREFIX: &str = "[safeline]";
const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::INFO;

static TRACING_INSTALLED: Once = Once::new();
static LOG_LEVEL: OnceLock<Mutex<LevelFilter>> = OnceLock::new();

fn log_level_handle() -> &'static Mutex<LevelFilter> {
    LOG_LEVEL.get_or_init(|| Mutex::new(DEFAULT_LOG_LEVEL))
}

fn current_log_level() -> LevelFilter {
    log_level_handle()
        .lock()
        .map_or(DEFAULT_LOG_LEVEL, |level| *level)
}

/// Caps console output at `level` (`"error"` .. `"trace"`, or `"off"`).
///
/// Unknown names fall back to `info`. The cap applies on top of `RUST_LOG`.
/// Returns the cap now in effect.
pub fn set_log_level(level: &str) -> LevelFilter {
    let parsed = LevelFilter::from_str(level).unwrap_or(DEFAULT_LOG_LEVEL);
    if let Ok(mut guard) = log_level_handle().lock() {
        *guard = parsed;
    }
    parsed
}

/// Installs a console subscriber (idempotent).
///
/// Honours `RUST_LOG` and defaults to `info`. Does nothing if another global
/// subscriber is already set.
pub fn install_tracing() {
    TRACING_INSTALLED.call_once(|| {
        let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let cap = filter::filter_fn(|metadata| level_allows(current_log_level(), *metadata.level()));

        let console = fmt::layer()
            .event_format(LineFormatter)
            .with_writer(PrefixedWriter)
            .with_ansi(false)
            .with_filter(env)
            .with_filter(cap);

        if tracing_subscriber::registry()
            .with(console)
            .try_init()
            .is_err()
        {
            eprintln!("{TRACING_PREFIX} a global tracing subscriber is already installed");
        }
    });
}

const fn level_allows(filter: LevelFilter, level: Level) -> bool {
    match filter {
        LevelFilter::OFF => false,
        LevelFilter::ERROR => matches!(level, Level::ERROR),
        LevelFilter::WARN => matches!(level, Level::ERROR | Level::WARN),
        LevelFilter::INFO => matches!(level, Level::ERROR | Level::WARN | Level::INFO),
        LevelFilter::DEBUG => matches!(
            level,
            Level::ERROR | Level::WARN | Level::INFO | Level::DEBUG
        ),
        LevelFilter::TRACE => true,
    }
}

// ============================================================================
// Console Output
// ============================================================================

#[derive(Clone, Default)]
struct PrefixedWriter;

impl<'a> MakeWriter<'a> for PrefixedWriter {
    type Writer = PrefixedWriterInner<io::Stderr>;

    fn make_writer(&'a self) -> Self::Writer {
        PrefixedWriterInner {
            inner: io::stderr(),
            wrote_prefix: false,
        }
    }
}

struct PrefixedWriterInner<W> {
    inner: W,
    wrote_prefix: bool,
}

impl<W: Write> Write for PrefixedWriterInner<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.wrote_prefix {
            self.inner.write_all(TRACING_PREFIX.as_bytes())?;
            self.inner.write_all(b" ")?;
            self.wrote_prefix = true;
        }
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[derive(Clone, Default)]
struct LineFormatter;

impl<S, N> FormatEvent<S, N> for LineFormatter
where
    S: tracing::Subscriber + for<'span> LookupSpan<'span>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        ctx: &fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        write!(writer, "{} {}: ", metadata.level(), metadata.target())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
