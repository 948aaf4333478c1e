use poolscope_core::Envelope;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::commands::Rendered;
use crate::error::CliError;

/// Column-aligned text table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextTable {
    title: Option<String>,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            title: None,
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn lines(&self) -> Vec<String> {
        let mut widths = self.headers.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
        for row in &self.rows {
            for (index, cell) in row.iter().enumerate() {
                let width = cell.chars().count();
                match widths.get_mut(index) {
                    Some(current) => *current = (*current).max(width),
                    None => widths.push(width),
                }
            }
        }

        let format_row = |cells: &[String]| {
            cells
                .iter()
                .enumerate()
                .map(|(index, cell)| format!("{cell:<width$}", width = widths[index]))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_owned()
        };

        let mut lines = Vec::with_capacity(self.rows.len() + 3);
        if let Some(title) = &self.title {
            lines.push(title.clone());
        }
        lines.push(format_row(&self.headers));
        lines.push(
            widths
                .iter()
                .map(|width| "-".repeat(*width))
                .collect::<Vec<_>>()
                .join("  "),
        );
        lines.extend(self.rows.iter().map(|row| format_row(row)));
        lines
    }
}

pub fn render(rendered: &Rendered, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(&rendered.envelope)?
            } else {
                serde_json::to_string(&rendered.envelope)?
            };
            println!("{payload}");
        }
        OutputFormat::Table => {
            for line in table_lines(&rendered.envelope, &rendered.tables)? {
                println!("{line}");
            }
        }
    }

    Ok(())
}

fn table_lines(envelope: &Envelope<Value>, tables: &[TextTable]) -> Result<Vec<String>, CliError> {
    let mut lines = Vec::new();

    if tables.is_empty() {
        lines.extend(serde_json::to_string_pretty(&envelope.data)?.lines().map(str::to_owned));
    }
    for (index, table) in tables.iter().enumerate() {
        if index > 0 {
            lines.push(String::new());
        }
        lines.extend(table.lines());
    }

    if !envelope.meta.warnings.is_empty() {
        lines.push(String::new());
        lines.push(String::from("warnings:"));
        lines.extend(envelope.meta.warnings.iter().map(|warning| format!("  - {warning}")));
    }

    if !envelope.errors.is_empty() {
        lines.push(String::new());
        lines.push(String::from("errors:"));
        lines.extend(
            envelope
                .errors
                .iter()
                .map(|error| format!("  - {}: {}", error.code, error.message)),
        );
    }

    Ok(lines)
}
