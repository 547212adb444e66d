//! Console printer utility with color support.

use serde::{Deserialize, Serialize};

/// Available colors for printed output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrinterColor {
    Red,
    Green,
    Yellow,
    Cyan,
    BoldGreen,
    BoldYellow,
    BoldPurple,
    BoldBlue,
}

impl PrinterColor {
    /// ANSI escape code for this color.
    fn ansi_code(&self) -> &'static str {
        match self {
            Self::Red => "\x1b[31m",
            Self::Green => "\x1b[32m",
            Self::Yellow => "\x1b[33m",
            Self::Cyan => "\x1b[36m",
            Self::BoldGreen => "\x1b[1;32m",
            Self::BoldYellow => "\x1b[1;33m",
            Self::BoldPurple => "\x1b[1;35m",
            Self::BoldBlue => "\x1b[1;34m",
        }
    }
}

/// ANSI reset code.
const RESET: &str = "\x1b[0m";

/// A piece of colored text.
pub struct ColoredText {
    pub text: String,
    pub color: PrinterColor,
}

impl ColoredText {
    pub fn new(text: impl Into<String>, color: PrinterColor) -> Self {
        Self {
            text: text.into(),
            color,
        }
    }
}

/// Printer for console output with color support.
#[derive(Debug, Clone, Default)]
pub struct Printer;

impl Printer {
    pub fn new() -> Self {
        Self
    }

    /// Wrap `content` in the escape codes for `color`.
    pub fn paint(&self, content: &str, color: PrinterColor) -> String {
        format!("{}{}{}", color.ansi_code(), content, RESET)
    }

    /// Print a message with the specified color.
    pub fn print(&self, content: &str, color: PrinterColor) {
        println!("{}", self.paint(content, color));
    }

    /// Print multiple colored text segments on a single line.
    pub fn print_colored(&self, segments: &[ColoredText]) {
        let line: String = segments
            .iter()
            .map(|s| self.paint(&s.text, s.color))
            .collect();
        println!("{}", line);
    }
}

/// Verbose narration of agent activity.
///
/// Silent unless `verbose` is set, so callers can narrate unconditionally.
#[derive(Debug, Clone, Default)]
pub struct StepPrinter {
    pub verbose: bool,
    printer: Printer,
}

impl StepPrinter {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            printer: Printer::new(),
        }
    }

    pub fn task_started(&self, role: &str, description: &str) {
        if !self.verbose {
            return;
        }
        self.printer.print_colored(&[
            ColoredText::new("# Agent: ", PrinterColor::BoldPurple),
            ColoredText::new(role, PrinterColor::BoldGreen),
        ]);
        self.printer.print_colored(&[
            ColoredText::new("## Task: ", PrinterColor::BoldPurple),
            ColoredText::new(description, PrinterColor::Green),
        ]);
    }

    pub fn tool_used(&self, role: &str, thought: &str, tool: &str, input: &str, observation: &str) {
        if !self.verbose {
            return;
        }
        self.printer.print_colored(&[
            ColoredText::new("\n# Agent: ", PrinterColor::BoldPurple),
            ColoredText::new(role, PrinterColor::BoldGreen),
        ]);
        if !thought.is_empty() {
            self.printer.print_colored(&[
                ColoredText::new("## Thought: ", PrinterColor::BoldPurple),
                ColoredText::new(thought, PrinterColor::Green),
            ]);
        }
        self.printer.print_colored(&[
            ColoredText::new("## Using tool: ", PrinterColor::BoldPurple),
            ColoredText::new(tool, PrinterColor::Green),
        ]);
        self.printer.print_colored(&[
            ColoredText::new("## Tool Input: ", PrinterColor::BoldPurple),
            ColoredText::new(input, PrinterColor::Green),
        ]);
        self.printer.print_colored(&[
            ColoredText::new("## Tool Output: ", PrinterColor::BoldPurple),
            ColoredText::new(observation, PrinterColor::Green),
        ]);
    }

    pub fn final_answer(&self, role: &str, answer: &str) {
        if !self.verbose {
            return;
        }
        self.printer.print_colored(&[
            ColoredText::new("\n# Agent: ", PrinterColor::BoldPurple),
            ColoredText::new(role, PrinterColor::BoldGreen),
        ]);
        self.printer.print_colored(&[
            ColoredText::new("## Final Answer: ", PrinterColor::BoldPurple),
            ColoredText::new(answer, PrinterColor::Green),
        ]);
    }

    pub fn warning(&self, message: &str) {
        if self.verbose {
            self.printer.print(message, PrinterColor::BoldYellow);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paint_wraps_in_escape_codes() {
        let painted = Printer::new().paint("hi", PrinterColor::Red);
        assert_eq!(painted, "\x1b[31mhi\x1b[0m");
    }

    #[test]
    fn test_bold_colors_use_bold_attribute() {
        let painted = Printer::new().paint("x", PrinterColor::BoldPurple);
        assert!(painted.starts_with("\x1b[1;35m"));
    }
}
