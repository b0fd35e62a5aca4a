//! crates/logging/src/elapsed.rs
//! Human-readable elapsed-time rendering for task log lines.

use std::time::Duration;

/// Renders `elapsed` with the largest sensible unit.
///
/// Sub-millisecond values print in microseconds (or nanoseconds below one
/// microsecond), values under a second in whole milliseconds, values under a
/// minute in seconds with up to three significant decimals, and longer values
/// as minutes plus whole seconds.
#[must_use]
pub fn format_elapsed(elapsed: Duration) -> String {
    let nanos = elapsed.as_nanos();
    if nanos < 1_000 {
        return format!("{nanos} ns");
    }
    if nanos < 1_000_000 {
        return format!("{} μs", nanos / 1_000);
    }
    if nanos < 1_000_000_000 {
        return format!("{} ms", nanos / 1_000_000);
    }
    let secs = elapsed.as_secs();
    if secs < 60 {
        let rendered = format!("{:.3}", elapsed.as_secs_f64());
        let trimmed = rendered.trim_end_matches('0').trim_end_matches('.');
        return format!("{trimmed} s");
    }
    let minutes = secs / 60;
    let remainder = secs % 60;
    if remainder == 0 {
        format!("{minutes} min")
    } else {
        format!("{minutes} min {remainder} s")
    }
}
