//! Console logger for crew-level progress.

use chrono::Local;

use crate::utilities::printer::{Printer, PrinterColor};

/// Logger with optional verbose output and timestamps.
#[derive(Debug, Clone)]
pub struct Logger {
    /// Enables verbose logging with timestamps.
    pub verbose: bool,
    /// Default color for log messages.
    pub default_color: PrinterColor,
    printer: Printer,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Logger {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            default_color: PrinterColor::BoldYellow,
            printer: Printer::new(),
        }
    }

    /// `[timestamp][LEVEL]: message`, as printed by [`Logger::log`].
    pub fn format_line(level: &str, message: &str, timestamp: &str) -> String {
        format!("\n[{}][{}]: {}", timestamp, level.to_uppercase(), message)
    }

    /// Print a timestamped message when verbose. `color` overrides the
    /// default color.
    pub fn log(&self, level: &str, message: &str, color: Option<PrinterColor>) {
        if !self.verbose {
            return;
        }
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        self.printer.print(
            &Self::format_line(level, message, &timestamp),
            color.unwrap_or(self.default_color),
        );
    }
}
