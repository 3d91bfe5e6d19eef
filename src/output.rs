use std::io::{self, Write};

use serde::Serialize;

use crate::app::{DownloadResult, PreviewResult, QueryResult, SuggestResult};
use crate::download::{DownloadOutcome, DownloadSink, DownloadState};
use crate::session::cell_text;

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Interactive,
    NonInteractive,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_preview(result: &PreviewResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_suggestions(result: &SuggestResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_download(result: &DownloadResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_query(result: &QueryResult) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl DownloadSink for JsonOutput {
    fn transition(&self, _state: DownloadState) {}
}

/// Plain text for a terminal user.
pub struct TextOutput;

impl TextOutput {
    pub fn print_preview(result: &PreviewResult) -> io::Result<()> {
        let mut stdout = io::stdout();
        let columns = result.dataset.columns();
        let header: Vec<_> = columns.iter().map(|column| column.name).collect();
        writeln!(stdout, "{}", header.join("\t"))?;
        for row in &result.rows {
            let cells: Vec<_> = columns
                .iter()
                .map(|column| row.get(column.key).map(cell_text).unwrap_or_default())
                .collect();
            writeln!(stdout, "{}", cells.join("\t"))?;
        }
        let more = if result.has_more { " (more available)" } else { "" };
        writeln!(stdout, "{} rows{more}", result.row_count)?;
        Ok(())
    }

    pub fn print_suggestions(result: &SuggestResult) -> io::Result<()> {
        let mut stdout = io::stdout();
        if result.suggestions.is_empty() {
            writeln!(stdout, "no suggestions for {:?}", result.text)?;
        }
        for suggestion in &result.suggestions {
            writeln!(stdout, "{suggestion}")?;
        }
        Ok(())
    }

    pub fn print_download(result: &DownloadResult) -> io::Result<()> {
        let mut stdout = io::stdout();
        match &result.outcome {
            DownloadOutcome::Saved(saved) => writeln!(
                stdout,
                "saved {} ({} bytes, {})",
                saved.path, saved.bytes, saved.content_type
            ),
            DownloadOutcome::Failed { message } => writeln!(stdout, "{message}"),
        }
    }

    pub fn print_query(result: &QueryResult) -> io::Result<()> {
        writeln!(io::stdout(), "{}", result.query)
    }
}

impl DownloadSink for TextOutput {
    fn transition(&self, state: DownloadState) {
        let label = match state {
            DownloadState::Idle => "done",
            DownloadState::Requesting => "requesting",
            DownloadState::Waiting => "waiting for server",
        };
        eprintln!("download: {label}");
    }
}
