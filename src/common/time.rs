//! Time-related utilities.

use chrono::Local;

/// Current local wall-clock time as `HH:MM`, used for room activity log lines.
pub fn clock_time() -> String {
    Local::now().format("%H:%M").to_string()
}
