//! Output formatting for the CLI.

use anyhow::Result;
use chrono::{DateTime, Utc};
use console::{measure_text_width, style, truncate_str, StyledObject, Term};
use projects_client::{EditOutcome, ProjectRef};
use projects_core::{ItemType, Project, ProjectItem};
use serde::Serialize;
use std::fmt::Write;

/// Widest a title may be in a table.
const TITLE_WIDTH: usize = 80;
const ELLIPSIS: &str = "...";

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
}

/// Renders results for one invocation.
///
/// Colors, relative times, and terminal-only lines are decided here rather
/// than by each command.
#[derive(Debug, Clone)]
pub struct Printer {
    format: OutputFormat,
    is_tty: bool,
    verbose: bool,
    now: DateTime<Utc>,
}

impl Printer {
    /// Create a printer for stdout.
    #[must_use]
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self {
            format,
            is_tty: Term::stdout().is_term(),
            verbose,
            now: Utc::now(),
        }
    }

    #[must_use]
    pub const fn with_tty(mut self, is_tty: bool) -> Self {
        self.is_tty = is_tty;
        self
    }

    #[cfg(test)]
    #[must_use]
    pub const fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Render a value in the selected format.
    ///
    /// # Errors
    /// Returns error if the value cannot be serialized.
    pub fn render<T: Serialize + HumanDisplay + ?Sized>(&self, value: &T) -> Result<String> {
        Ok(match self.format {
            OutputFormat::Human => value.human_display(self),
            OutputFormat::Json => serde_json::to_string_pretty(value)?,
            OutputFormat::Yaml => serde_yaml::to_string(value)?,
        })
    }

    /// Print a value in the selected format.
    ///
    /// # Errors
    /// Returns error if the value cannot be serialized.
    pub fn print<T: Serialize + HumanDisplay + ?Sized>(&self, value: &T) -> Result<()> {
        let out = self.render(value)?;
        if !out.is_empty() {
            println!("{}", out.trim_end_matches('\n'));
        }
        Ok(())
    }

    /// Print a progress note, only with `--verbose` on a terminal.
    pub fn status(&self, message: &str) {
        if self.verbose && self.is_tty && self.format == OutputFormat::Human {
            println!("{message}");
        }
    }

    fn paint<D>(&self, styled: StyledObject<D>) -> StyledObject<D> {
        styled.force_styling(self.is_tty)
    }

    fn bold(&self, text: &str) -> String {
        self.paint(style(text).bold()).to_string()
    }

    fn dim(&self, text: &str) -> String {
        self.paint(style(text).dim()).to_string()
    }

    fn number(&self, number: Option<u64>) -> String {
        number.map_or_else(String::new, |n| {
            self.paint(style(format!("#{n}")).green()).to_string()
        })
    }

    fn visibility(&self, public: bool) -> String {
        if public {
            self.paint(style("public").black().bright()).to_string()
        } else {
            self.paint(style("private").yellow()).to_string()
        }
    }

    fn state(&self, state: Option<&str>) -> String {
        match state {
            Some("OPEN") => self.paint(style("open").green()).to_string(),
            Some("CLOSED") => self.paint(style("closed").black().bright()).to_string(),
            Some("MERGED") => self.paint(style("merged").magenta()).to_string(),
            _ => String::new(),
        }
    }

    fn ago(&self, time: Option<DateTime<Utc>>) -> String {
        time.map_or_else(String::new, |t| ago(self.now, t))
    }
}

/// Trait for human-readable display.
pub trait HumanDisplay {
    fn human_display(&self, printer: &Printer) -> String;
}

impl HumanDisplay for [Project] {
    fn human_display(&self, printer: &Printer) -> String {
        let mut out = String::new();
        if printer.is_tty {
            writeln!(out, "\nShowing {}\n", pluralize(self.len(), "project")).unwrap();
        }

        let rows: Vec<Vec<String>> = self
            .iter()
            .map(|p| {
                vec![
                    printer.number(Some(u64::from(p.number))),
                    printer.bold(&truncate(TITLE_WIDTH, &p.title)),
                    printer.visibility(p.public),
                    printer.dim(&printer.ago(p.created_at)),
                    p.description.clone().unwrap_or_default(),
                ]
            })
            .collect();
        out.push_str(&table(&rows));
        out
    }
}

impl HumanDisplay for Project {
    fn human_display(&self, printer: &Printer) -> String {
        let mut out = String::new();

        writeln!(
            out,
            "{} {}",
            printer.bold(&self.title),
            printer.number(Some(u64::from(self.number)))
        )
        .unwrap();
        if let Some(description) = self.description.as_deref().filter(|d| !d.is_empty()) {
            writeln!(out, "{description}").unwrap();
        }

        let creator = self.creator.as_ref().map_or("ghost", |c| c.login.as_str());
        writeln!(
            out,
            "{} • {creator} opened {}",
            printer.visibility(self.public),
            printer.ago(self.created_at)
        )
        .unwrap();

        if let Some(body) = self.body.as_deref().filter(|b| !b.is_empty()) {
            writeln!(out, "\n{}", body.trim_end()).unwrap();
        }

        if let Some(items) = &self.items {
            writeln!(
                out,
                "\nShowing {} of {}\n",
                items.nodes.len(),
                pluralize(items.total_count, "item")
            )
            .unwrap();

            let rows: Vec<Vec<String>> = items.nodes.iter().map(|i| item_row(printer, i)).collect();
            out.push_str(&table(&rows));
        }

        if printer.is_tty {
            writeln!(
                out,
                "\n{}",
                printer.dim(&format!("View this project on GitHub: {}", self.url))
            )
            .unwrap();
        }

        out
    }
}

fn item_row(printer: &Printer, item: &ProjectItem) -> Vec<String> {
    let kind = match item.item_type {
        Some(ItemType::Issue) => "Issue",
        Some(ItemType::PullRequest) => "PullRequest",
        Some(ItemType::DraftIssue) => "Draft",
        Some(ItemType::Redacted) => "Redacted",
        Some(ItemType::Unknown) | None => "",
    };
    let content = item.content.clone().unwrap_or_default();

    vec![
        kind.to_string(),
        printer.number(content.number),
        truncate(TITLE_WIDTH, content.title.as_deref().unwrap_or_default()),
        printer.state(content.state.as_deref()),
        printer.dim(&printer.ago(content.created_at)),
    ]
}

/// Edits and clones print the board URL, on a terminal only.
impl HumanDisplay for EditOutcome {
    fn human_display(&self, printer: &Printer) -> String {
        if printer.is_tty {
            self.url.clone()
        } else {
            String::new()
        }
    }
}

impl HumanDisplay for ProjectRef {
    fn human_display(&self, printer: &Printer) -> String {
        if printer.is_tty {
            self.url.clone()
        } else {
            String::new()
        }
    }
}

/// Align columns two spaces apart; the last column is not padded.
fn table(rows: &[Vec<String>]) -> String {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|c| {
            rows.iter()
                .filter_map(|r| r.get(c))
                .map(|cell| measure_text_width(cell))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    for row in rows {
        let mut line = String::new();
        for (c, cell) in row.iter().enumerate() {
            line.push_str(cell);
            if c + 1 < row.len() {
                let pad = widths[c] - measure_text_width(cell) + 2;
                line.push_str(&" ".repeat(pad));
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// "1 issue", "2 issues".
pub fn pluralize(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

/// Shorten text to `max_width` columns, ending in "..." when there is room.
pub fn truncate(max_width: usize, text: &str) -> String {
    if measure_text_width(text) <= max_width {
        return text.to_string();
    }

    let tail = if max_width >= ELLIPSIS.len() + 2 { ELLIPSIS } else { "" };
    let mut out = truncate_str(text, max_width, tail).into_owned();
    if measure_text_width(&out) < max_width {
        out.push(' ');
    }
    out
}

/// Approximate age, e.g. "about 3 days ago".
pub fn ago(now: DateTime<Utc>, time: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(time);
    let hours = usize::try_from(elapsed.num_hours()).unwrap_or(0);

    let approx = if elapsed.num_minutes() < 1 {
        return "just now".to_string();
    } else if elapsed.num_hours() < 1 {
        pluralize(usize::try_from(elapsed.num_minutes()).unwrap_or(0), "minute")
    } else if hours < 24 {
        pluralize(hours, "hour")
    } else if hours < 30 * 24 {
        pluralize(hours / 24, "day")
    } else if hours < 365 * 24 {
        pluralize(hours / 24 / 30, "month")
    } else {
        pluralize(hours / 24 / 365, "year")
    };

    format!("about {approx} ago")
}
