//! Process-wide debug options.
//!
//! Both switches default to off and are set explicitly, usually once at the
//! start of a test run.

use std::fmt::Debug;
use std::panic::Location;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

static PRINT_DEBUG_LOG: AtomicBool = AtomicBool::new(false);
static DEBUG_CONDITIONS: AtomicBool = AtomicBool::new(false);

/// Debug switches for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Options {
    /// Trace every resolution: stubs tried, condition traces, outcome.
    pub print_debug_log: bool,
    /// Dump expected vs. actual values for every comparison.
    pub debug_conditions: bool,
}

/// Replace the process-wide options.
pub fn set_options(options: Options) {
    PRINT_DEBUG_LOG.store(options.print_debug_log, Ordering::SeqCst);
    DEBUG_CONDITIONS.store(options.debug_conditions, Ordering::SeqCst);
}

/// Current process-wide options.
pub fn options() -> Options {
    Options {
        print_debug_log: PRINT_DEBUG_LOG.load(Ordering::Relaxed),
        debug_conditions: DEBUG_CONDITIONS.load(Ordering::Relaxed),
    }
}

/// Short `file:Lline` tag for a call site.
pub(crate) fn site(location: Option<&'static Location<'static>>) -> String {
    match location {
        Some(loc) => {
            let file = loc.file().rsplit(['/', '\\']).next().unwrap_or(loc.file());
            format!("{}:L{}", file, loc.line())
        }
        None => "<unknown>".to_string(),
    }
}

/// Emit a message when `print_debug_log` is on.
pub(crate) fn debug_log(location: Option<&'static Location<'static>>, message: impl AsRef<str>) {
    if !PRINT_DEBUG_LOG.load(Ordering::Relaxed) {
        return;
    }
    info!("[{}] {}", site(location), message.as_ref());
}

/// Dump a comparison when `debug_conditions` is on.
pub(crate) fn dump_condition<E: Debug + ?Sized, A: Debug + ?Sized>(
    location: Option<&'static Location<'static>>,
    expected: &E,
    actual: &A,
    matched: bool,
) {
    if !DEBUG_CONDITIONS.load(Ordering::Relaxed) {
        return;
    }
    info!(
        matched,
        "[{}] expected: {:?}, actual: {:?}",
        site(location),
        expected,
        actual
    );
}
