//! Terminal rendering for Markdown results.
//!
//! Line-oriented: block structure (headings, lists, quotes, rules, fenced
//! code) is decided per line, then inline spans (bold, italic, code) are
//! styled with crossterm. Output is plain text plus ANSI attributes.

use std::io::{self, Write};

use crossterm::style::{Color, Stylize};
use once_cell::sync::Lazy;
use regex::Regex;

static BOLD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*|__([^_]+)__").expect("valid regex"));
static ITALIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*([^*\s][^*]*)\*|\b_([^_]+)_\b").expect("valid regex"));
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").expect("valid regex"));
static NUMBERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)[.)]\s+(.*)$").expect("valid regex"));
static RULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:-{3,}|\*{3,}|_{3,})\s*$").expect("valid regex"));

/// Width of horizontal rules and H1 underlines.
const RULE_WIDTH: usize = 60;

/// Render `markdown` into an ANSI-styled string.
pub fn render(markdown: &str) -> String {
    let mut out = String::new();
    let mut in_code_block = false;

    for line in markdown.lines() {
        let trimmed = line.trim_start();

        if trimmed.starts_with("```") {
            in_code_block = !in_code_block;
            continue;
        }
        if in_code_block {
            out.push_str(&format!("    {}", line.with(Color::Cyan)));
            out.push('\n');
            continue;
        }

        out.push_str(&render_block(trimmed));
        out.push('\n');
    }

    out
}

/// Render `markdown` and write it to stdout.
pub fn print(markdown: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(render(markdown).as_bytes())?;
    stdout.flush()
}

fn render_block(line: &str) -> String {
    if line.is_empty() {
        return String::new();
    }

    if let Some(level) = heading_level(line) {
        let text = line[level..].trim();
        let styled = render_inline(text);
        return match level {
            1 => format!(
                "{}\n{}",
                styled.as_str().bold().underlined(),
                "═".repeat(RULE_WIDTH.min(text.chars().count().max(3)))
            ),
            2 => format!("{}", styled.as_str().bold().with(Color::Magenta)),
            _ => format!("{}", styled.as_str().bold()),
        };
    }

    if RULE.is_match(line) {
        return "─".repeat(RULE_WIDTH);
    }

    if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return format!("  • {}", render_inline(rest));
    }

    if let Some(caps) = NUMBERED.captures(line) {
        return format!("  {}. {}", &caps[1], render_inline(&caps[2]));
    }

    if let Some(rest) = line.strip_prefix('>') {
        return format!("  ▌ {}", render_inline(rest.trim_start()).as_str().italic());
    }

    render_inline(line)
}

fn heading_level(line: &str) -> Option<usize> {
    let hashes = line.chars().take_while(|c| *c == '#').count();
    if (1..=6).contains(&hashes) && line[hashes..].starts_with(' ') {
        Some(hashes)
    } else {
        None
    }
}

/// Style inline spans. Code spans are printed verbatim; emphasis applies
/// only to the text between them.
fn render_inline(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in INLINE_CODE.captures_iter(text) {
        let (Some(span), Some(code)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&render_emphasis(&text[last..span.start()]));
        out.push_str(&code.as_str().with(Color::Cyan).to_string());
        last = span.end();
    }
    out.push_str(&render_emphasis(&text[last..]));
    out
}

fn render_emphasis(text: &str) -> String {
    let with_bold = BOLD.replace_all(text, |caps: &regex::Captures<'_>| {
        let inner = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
        inner.bold().to_string()
    });
    ITALIC
        .replace_all(&with_bold, |caps: &regex::Captures<'_>| {
            let inner = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            inner.italic().to_string()
        })
        .into_owned()
}
