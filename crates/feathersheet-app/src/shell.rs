//! Line-oriented command front-end over a [`Session`].
//!
//! Each input line is one command. Cells are addressed in A1 notation and
//! ranges as `A1:B2`.

use feathersheet_core::{CellCoord, DataType, SelectionRange};
use serde::Serialize;
use thiserror::Error;

use crate::error::AppError;
use crate::session::Session;

const DEFAULT_SHOW_ROWS: usize = 20;

const HELP: &str = "\
commands:
  open <path>           load a feather file
  save                  write back to the open file
  save-as <path>        write to a new file
  get <A1>              show a cell
  set <A1> <value>      edit a cell
  undo | redo           step through history
  copy <A1[:B2]>...     copy cells to the clipboard
  paste <A1>            paste the clipboard at a cell
  clip                  show clipboard text
  find <text>           start a new search
  next                  find the next match
  type <col> <dtype>    convert a column (int, float, str, bool, datetime, category)
  dtypes on|off         toggle dtype suffixes in headers
  dark                  toggle dark mode
  show [rows]           print the table
  schema                print column names and types as JSON
  help                  this text
  quit                  exit";

/// Result of running one command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellOutcome {
    Continue(String),
    Quit,
}

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Invalid cell reference: {0}")]
    InvalidCell(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("No search text, use find <text> first")]
    NoQuery,

    #[error(transparent)]
    App(#[from] AppError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct ColumnSchema<'a> {
    name: &'a str,
    dtype: DataType,
    display: &'static str,
}

#[derive(Debug)]
pub struct Shell {
    session: Session,
    last_query: Option<String>,
}

impl Shell {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            last_query: None,
        }
    }

    pub fn prompt(&self) -> String {
        let theme = if self.session.dark_mode() { "dark" } else { "light" };
        format!("{} [{}]> ", self.session.title(), theme)
    }

    /// Run one line; errors become the reply text
    pub fn run_line(&mut self, line: &str) -> ShellOutcome {
        let outcome = match self.execute(line) {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(command = line.trim(), error = %err, "command failed");
                ShellOutcome::Continue(format!("Error: {}", err))
            }
        };

        // No view to repaint; events are only traced.
        if let Ok(model) = self.session.model_mut() {
            for event in model.drain_events() {
                tracing::trace!(?event, "model event");
            }
        }
        outcome
    }

    fn execute(&mut self, line: &str) -> Result<ShellOutcome, CommandError> {
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        let reply = match command {
            "" => String::new(),
            "quit" | "exit" => return Ok(ShellOutcome::Quit),
            "help" => HELP.to_string(),
            "open" => {
                let path = required(rest, "open <path>")?;
                let message = self.session.open(path)?;
                self.last_query = None;
                message
            }
            "save" => self.session.save()?,
            "save-as" => {
                let path = required(rest, "save-as <path>")?;
                self.session.save_as(path)?
            }
            "get" => {
                let coord = parse_cell(required(rest, "get <A1>")?)?;
                let model = self.session.model()?;
                match model.get(coord.row, coord.col) {
                    Some(text) => format!("{} = {}", coord, text),
                    None => return Err(AppError::from(out_of_bounds(coord)).into()),
                }
            }
            "set" => {
                let (cell, value) = rest
                    .split_once(char::is_whitespace)
                    .map(|(cell, value)| (cell, value.trim()))
                    .unwrap_or((rest, ""));
                let coord = parse_cell(required(cell, "set <A1> <value>")?)?;
                self.session.set_cell(coord, value)?;
                let shown = self.session.model()?.get(coord.row, coord.col).unwrap_or_default();
                format!("{} = {}", coord, shown)
            }
            "undo" => self.session.undo()?,
            "redo" => self.session.redo()?,
            "copy" => {
                let cells = parse_selection(required(rest, "copy <A1[:B2]>...")?)?;
                match self.session.copy_selection(&cells)? {
                    Some(range) => format!(
                        "Copied selection: {}:{}, {}:{}",
                        range.start.row, range.end.row, range.start.col, range.end.col
                    ),
                    None => "Nothing selected".to_string(),
                }
            }
            "paste" => {
                let anchor = parse_cell(required(rest, "paste <A1>")?)?;
                let report = self.session.paste(anchor)?;
                let mut reply = format!("Pasted {} cells", report.written);
                if report.skipped > 0 {
                    reply.push_str(&format!(", {} outside the table", report.skipped));
                }
                for (coord, err) in &report.failures {
                    reply.push_str(&format!("\n  {}: {}", coord, err));
                }
                reply
            }
            "clip" => self.session.clipboard_text(),
            "find" => {
                let text = required(rest, "find <text>")?;
                self.session.begin_find();
                self.last_query = Some(text.to_string());
                self.find_next()?
            }
            "next" => self.find_next()?,
            "type" => {
                let (column, type_name) = rest
                    .split_once(char::is_whitespace)
                    .ok_or(CommandError::Usage("type <col> <dtype>"))?;
                let col = self.resolve_column(column)?;
                self.session.change_column_type(col, type_name.trim())?
            }
            "dtypes" => {
                let show = match rest {
                    "on" => true,
                    "off" => false,
                    _ => return Err(CommandError::Usage("dtypes on|off")),
                };
                self.session.set_show_dtypes(show);
                format!("Data types {}", if show { "shown" } else { "hidden" })
            }
            "dark" => {
                let dark = self.session.toggle_dark_mode();
                format!("Dark mode {}", if dark { "on" } else { "off" })
            }
            "show" => {
                let limit = if rest.is_empty() {
                    DEFAULT_SHOW_ROWS
                } else {
                    rest.parse().map_err(|_| CommandError::Usage("show [rows]"))?
                };
                self.render(limit)?
            }
            "schema" => {
                let table = self.session.model()?.table();
                let schema: Vec<ColumnSchema> = table
                    .columns()
                    .iter()
                    .map(|column| ColumnSchema {
                        name: column.name(),
                        dtype: column.dtype(),
                        display: column.dtype().name(),
                    })
                    .collect();
                serde_json::to_string_pretty(&schema)?
            }
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        Ok(ShellOutcome::Continue(reply))
    }

    fn find_next(&mut self) -> Result<String, CommandError> {
        let query = self.last_query.clone().ok_or(CommandError::NoQuery)?;
        let reply = match self.session.find_next(&query, None)? {
            Some(coord) => {
                let model = self.session.model()?;
                let text = model.get(coord.row, coord.col).unwrap_or_default();
                format!("Found at {}: {}", coord, text)
            }
            None => format!("No matches for '{}'", query),
        };
        Ok(reply)
    }

    /// Column by letter label, zero-based number or header name
    fn resolve_column(&self, column: &str) -> Result<usize, CommandError> {
        let table = self.session.model()?.table();
        let resolved = column
            .parse::<usize>()
            .ok()
            .or_else(|| table.column_index(column))
            .or_else(|| feathersheet_core::col_from_label(column));

        resolved
            .filter(|&col| col < table.column_count())
            .ok_or_else(|| CommandError::UnknownColumn(column.to_string()))
    }

    fn render(&self, limit: usize) -> Result<String, CommandError> {
        let model = self.session.model()?;
        let rows = model.row_count().min(limit);

        let mut header = vec![String::new()];
        header.extend((0..model.column_count()).filter_map(|col| model.header(col)));
        let mut lines = vec![header.join("\t")];

        for row in 0..rows {
            let mut cells = vec![model.row_label(row).unwrap_or_default().to_string()];
            cells.extend((0..model.column_count()).filter_map(|col| model.get(row, col)));
            lines.push(cells.join("\t"));
        }
        if model.row_count() > rows {
            lines.push(format!("... {} more rows", model.row_count() - rows));
        }
        Ok(lines.join("\n"))
    }
}

fn required<'a>(value: &'a str, usage: &'static str) -> Result<&'a str, CommandError> {
    if value.is_empty() {
        Err(CommandError::Usage(usage))
    } else {
        Ok(value)
    }
}

fn parse_cell(text: &str) -> Result<CellCoord, CommandError> {
    CellCoord::from_a1(text).ok_or_else(|| CommandError::InvalidCell(text.to_string()))
}

/// Whitespace-separated cells and `A1:B2` ranges.
///
/// A range contributes only its corners, which is all the bounding
/// rectangle needs.
fn parse_selection(text: &str) -> Result<Vec<CellCoord>, CommandError> {
    let mut cells = Vec::new();
    for part in text.split_whitespace() {
        match part.split_once(':') {
            Some((start, end)) => {
                let range = SelectionRange::new(parse_cell(start)?, parse_cell(end)?);
                cells.push(range.start);
                cells.push(range.end);
            }
            None => cells.push(parse_cell(part)?),
        }
    }
    Ok(cells)
}

fn out_of_bounds(coord: CellCoord) -> feathersheet_core::TableError {
    feathersheet_core::TableError::OutOfBounds {
        row: coord.row,
        col: coord.col,
    }
}
