use std::path::{Path, PathBuf};

use feathersheet_core::{CellCoord, FindCursor, SelectionRange, Table};
use feathersheet_io::{read_feather, write_feather};

use crate::clipboard::ClipboardProvider;
use crate::config::Config;
use crate::error::AppError;
use crate::model::{PasteReport, TableModel};

/// An open table and the file it came from
#[derive(Debug)]
pub struct Document {
    pub model: TableModel,
    pub path: Option<PathBuf>,
}

/// Everything the front-end talks to: the open document, the find cursor,
/// the clipboard and the presentation flags.
pub struct Session {
    config: Config,
    document: Option<Document>,
    find: FindCursor,
    clipboard: Box<dyn ClipboardProvider>,
}

impl Session {
    pub fn new(config: Config, clipboard: Box<dyn ClipboardProvider>) -> Self {
        Self {
            config,
            document: None,
            find: FindCursor::new(),
            clipboard,
        }
    }

    pub fn model(&self) -> Result<&TableModel, AppError> {
        self.document
            .as_ref()
            .map(|doc| &doc.model)
            .ok_or(AppError::NoDocument)
    }

    pub fn model_mut(&mut self) -> Result<&mut TableModel, AppError> {
        self.document
            .as_mut()
            .map(|doc| &mut doc.model)
            .ok_or(AppError::NoDocument)
    }

    /// Load a file, replacing the open document and its history.
    ///
    /// On failure the current document stays as it was.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<String, AppError> {
        let path = path.as_ref();
        let table = read_feather(path).inspect_err(|err| {
            tracing::error!(path = %path.display(), error = %err, "failed to open file");
        })?;
        self.load_table(table, Some(path.to_path_buf()));
        Ok(format!("Loaded file: {}", path.display()))
    }

    /// Install a table as the open document
    pub fn load_table(&mut self, table: Table, path: Option<PathBuf>) {
        let mut model = TableModel::with_history_depth(table, self.config.history_depth);
        model.set_show_dtypes(self.config.show_dtypes);
        model.drain_events();

        self.document = Some(Document { model, path });
        self.find.reset();
    }

    pub fn save(&mut self) -> Result<String, AppError> {
        let document = self.document.as_ref().ok_or(AppError::NoDocument)?;
        let path = document.path.clone().ok_or(AppError::NoPath)?;
        self.save_as(path)
    }

    pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<String, AppError> {
        let path = path.as_ref();
        let document = self.document.as_mut().ok_or(AppError::NoDocument)?;

        write_feather(document.model.table(), path)?;
        document.path = Some(path.to_path_buf());
        Ok(format!("Saved to: {}", path.display()))
    }

    /// Title for the window chrome
    pub fn title(&self) -> String {
        let name = self
            .document
            .as_ref()
            .and_then(|doc| doc.path.as_ref())
            .and_then(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned());
        match name {
            Some(name) => format!("Feather Spreadsheet - {}", name),
            None => "Feather Spreadsheet".to_string(),
        }
    }

    /// Copy the bounding rectangle of the selected cells to the clipboard
    pub fn copy_selection(
        &mut self,
        selected: &[CellCoord],
    ) -> Result<Option<SelectionRange>, AppError> {
        let model = self.model()?;
        let Some(range) = SelectionRange::bounding(selected.iter().copied()) else {
            return Ok(None);
        };

        let text = model.copy(range);
        self.clipboard.set_text(text);
        tracing::debug!(range = %range, "copied selection");
        Ok(Some(range))
    }

    /// Paste the clipboard at `anchor`; an empty clipboard does nothing
    pub fn paste(&mut self, anchor: CellCoord) -> Result<PasteReport, AppError> {
        let text = self.clipboard.get_text();
        let model = self.model_mut()?;
        if text.is_empty() {
            return Ok(PasteReport::default());
        }
        Ok(model.paste(&text, anchor))
    }

    pub fn clipboard_text(&self) -> String {
        self.clipboard.get_text()
    }

    pub fn set_clipboard_text(&mut self, text: impl Into<String>) {
        self.clipboard.set_text(text.into());
    }

    pub fn undo(&mut self) -> Result<String, AppError> {
        let message = if self.model_mut()?.undo() {
            "Undo successful"
        } else {
            "Nothing to undo"
        };
        Ok(message.to_string())
    }

    pub fn redo(&mut self) -> Result<String, AppError> {
        let message = if self.model_mut()?.redo() {
            "Redo successful"
        } else {
            "Nothing to redo"
        };
        Ok(message.to_string())
    }

    pub fn set_cell(&mut self, coord: CellCoord, raw: &str) -> Result<(), AppError> {
        Ok(self.model_mut()?.set(coord.row, coord.col, raw)?)
    }

    pub fn change_column_type(&mut self, col: usize, type_name: &str) -> Result<String, AppError> {
        self.model_mut()?.change_column_type(col, type_name)?;
        Ok(format!("Column type changed to {}", type_name))
    }

    /// Start a new find session; the next search begins at the origin
    pub fn begin_find(&mut self) {
        self.find.reset();
    }

    /// Find the next match, continuing after `selection` when one is given
    pub fn find_next(
        &mut self,
        text: &str,
        selection: Option<CellCoord>,
    ) -> Result<Option<CellCoord>, AppError> {
        let model = self
            .document
            .as_ref()
            .map(|doc| &doc.model)
            .ok_or(AppError::NoDocument)?;
        if let Some(coord) = selection {
            self.find.seed(coord);
        }

        let found = self.find.find_next(model.table(), text);
        match found {
            Some(coord) => tracing::debug!(query = text, cell = %coord, "found"),
            None => tracing::debug!(query = text, "not found"),
        }
        Ok(found)
    }

    pub fn show_dtypes(&self) -> bool {
        self.config.show_dtypes
    }

    /// Toggle dtype suffixes in headers for this and later documents
    pub fn set_show_dtypes(&mut self, show: bool) {
        self.config.show_dtypes = show;
        if let Some(document) = self.document.as_mut() {
            document.model.set_show_dtypes(show);
        }
    }

    pub fn dark_mode(&self) -> bool {
        self.config.dark_mode
    }

    pub fn toggle_dark_mode(&mut self) -> bool {
        self.config.dark_mode = !self.config.dark_mode;
        self.config.dark_mode
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("document", &self.document)
            .field("find", &self.find)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use feathersheet_core::Column;

    fn session_with_table() -> Session {
        let mut session = Session::new(Config::default(), Box::new(MemoryClipboard::new()));
        session.load_table(
            Table::new(vec![
                Column::ints("id", &[1, 2, 3]),
                Column::strs("name", &["alpha", "beta", "gamma"]),
            ])
            .unwrap(),
            None,
        );
        session
    }

    #[test]
    fn test_no_document() {
        let mut session = Session::new(Config::default(), Box::new(MemoryClipboard::new()));
        assert!(matches!(session.undo(), Err(AppError::NoDocument)));
        assert!(matches!(session.save(), Err(AppError::NoDocument)));
        assert!(matches!(session.find_next("x", None), Err(AppError::NoDocument)));
        assert_eq!(session.title(), "Feather Spreadsheet");
    }

    #[test]
    fn test_undo_redo_messages() {
        let mut session = session_with_table();
        assert_eq!(session.undo().unwrap(), "Nothing to undo");

        session.set_cell(CellCoord::new(0, 1), "omega").unwrap();
        assert_eq!(session.undo().unwrap(), "Undo successful");
        assert_eq!(session.redo().unwrap(), "Redo successful");
        assert_eq!(session.redo().unwrap(), "Nothing to redo");
    }

    #[test]
    fn test_copy_uses_bounding_rectangle() {
        let mut session = session_with_table();
        let range = session
            .copy_selection(&[CellCoord::new(0, 0), CellCoord::new(1, 1)])
            .unwrap()
            .unwrap();

        assert_eq!(range.cell_count(), 4);
        assert_eq!(session.clipboard_text(), "1\talpha\n2\tbeta");
        assert_eq!(session.copy_selection(&[]).unwrap(), None);
    }

    #[test]
    fn test_paste_from_clipboard() {
        let mut session = session_with_table();
        session.copy_selection(&[CellCoord::new(0, 1)]).unwrap();

        let report = session.paste(CellCoord::new(2, 1)).unwrap();
        assert_eq!(report.written, 1);
        assert_eq!(session.model().unwrap().get(2, 1).as_deref(), Some("alpha"));

        session.set_clipboard_text("");
        let report = session.paste(CellCoord::origin()).unwrap();
        assert_eq!(report.written, 0);
    }

    #[test]
    fn test_find_session() {
        let mut session = session_with_table();
        session.begin_find();

        assert_eq!(session.find_next("A", None).unwrap(), Some(CellCoord::new(0, 1)));
        assert_eq!(session.find_next("A", None).unwrap(), Some(CellCoord::new(1, 1)));

        session.begin_find();
        assert_eq!(session.find_next("a", None).unwrap(), Some(CellCoord::new(0, 1)));

        let seeded = session.find_next("a", Some(CellCoord::new(2, 1))).unwrap();
        assert_eq!(seeded, Some(CellCoord::new(0, 1)));
    }

    #[test]
    fn test_presentation_flags() {
        let mut session = session_with_table();
        assert!(!session.show_dtypes());
        session.set_show_dtypes(true);
        assert!(session.show_dtypes());
        assert!(session.model().unwrap().show_dtypes());
        assert_eq!(
            session.model().unwrap().header(1).as_deref(),
            Some("name (object)")
        );
        assert!(session.toggle_dark_mode());
        assert!(!session.toggle_dark_mode());
    }

    #[test]
    fn test_open_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("people.feather");
        let mut session = session_with_table();

        assert!(matches!(session.save(), Err(AppError::NoPath)));
        session.save_as(&path).unwrap();
        assert_eq!(session.title(), "Feather Spreadsheet - people.feather");

        session.set_cell(CellCoord::new(0, 0), "10").unwrap();
        session.save().unwrap();

        let mut reopened = Session::new(Config::default(), Box::new(MemoryClipboard::new()));
        reopened.open(&path).unwrap();
        let model = reopened.model().unwrap();
        assert_eq!(model.get(0, 0).as_deref(), Some("10"));
        assert!(!model.can_undo());
    }

    #[test]
    fn test_failed_open_keeps_document() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_with_table();
        session.set_cell(CellCoord::new(0, 0), "9").unwrap();

        let err = session.open(dir.path().join("missing.feather")).unwrap_err();
        assert!(matches!(err, AppError::Io(_)));

        let model = session.model().unwrap();
        assert_eq!(model.get(0, 0).as_deref(), Some("9"));
        assert!(model.can_undo());
    }
}
