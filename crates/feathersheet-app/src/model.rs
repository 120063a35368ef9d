use feathersheet_core::{
    coerce_input, paste_plan, serialize, CellCoord, DataType, SelectionRange, Table, TableError,
};
use feathersheet_history::{HistoryManager, DEFAULT_HISTORY_DEPTH};
use serde::Serialize;

/// Change notifications for the view layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ModelEvent {
    /// One cell changed; redraw just that cell
    CellChanged { coord: CellCoord },
    /// Values, types or shape may have changed anywhere
    LayoutChanged,
    /// Header text changed for columns `first..=last`
    HeadersChanged { first: usize, last: usize },
}

/// Outcome of a best-effort paste
#[derive(Debug, Default)]
pub struct PasteReport {
    pub written: usize,
    /// Cells that fell outside the table
    pub skipped: usize,
    pub failures: Vec<(CellCoord, TableError)>,
}

impl PasteReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Editable, undoable table bound to one open document
#[derive(Debug)]
pub struct TableModel {
    table: Table,
    history: HistoryManager<Table>,
    show_dtypes: bool,
    events: Vec<ModelEvent>,
}

impl TableModel {
    pub fn new(table: Table) -> Self {
        Self::with_history_depth(table, DEFAULT_HISTORY_DEPTH)
    }

    pub fn with_history_depth(table: Table, depth: usize) -> Self {
        Self {
            table,
            history: HistoryManager::new(depth),
            show_dtypes: false,
            events: Vec::new(),
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn row_count(&self) -> usize {
        self.table.row_count()
    }

    pub fn column_count(&self) -> usize {
        self.table.column_count()
    }

    pub fn dtype(&self, col: usize) -> Option<DataType> {
        self.table.dtype(col)
    }

    /// Display/edit string of a cell; `None` when out of bounds
    pub fn get(&self, row: usize, col: usize) -> Option<String> {
        self.table.display(row, col)
    }

    /// Write a raw edit string, coercing it to the column's declared type.
    ///
    /// The pre-edit state is journaled before coercion is attempted, so a
    /// rejected value still occupies an undo slot. Forward history is only
    /// discarded once the write succeeds.
    pub fn set(&mut self, row: usize, col: usize, raw: &str) -> Result<(), TableError> {
        let dtype = self
            .table
            .dtype(col)
            .filter(|_| row < self.table.row_count())
            .ok_or(TableError::OutOfBounds { row, col })?;

        self.history.push(self.table.clone());

        let value = coerce_input(raw, dtype).inspect_err(|err| {
            tracing::warn!(row, col, error = %err, "rejected cell edit");
        })?;
        self.table.set_value(row, col, value)?;
        self.history.clear_redo();

        self.events.push(ModelEvent::CellChanged {
            coord: CellCoord::new(row, col),
        });
        Ok(())
    }

    pub fn undo(&mut self) -> bool {
        let undone = self.history.undo(&mut self.table);
        if undone {
            self.events.push(ModelEvent::LayoutChanged);
        }
        undone
    }

    pub fn redo(&mut self) -> bool {
        let redone = self.history.redo(&mut self.table);
        if redone {
            self.events.push(ModelEvent::LayoutChanged);
        }
        redone
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &HistoryManager<Table> {
        &self.history
    }

    /// Change a column's declared type by name (`int`, `float`, `str`, ...).
    ///
    /// Unknown names are rejected before anything is journaled.
    pub fn change_column_type(&mut self, col: usize, type_name: &str) -> Result<(), TableError> {
        let target: DataType = type_name.parse()?;
        self.convert_column(col, target)
    }

    pub fn convert_column(&mut self, col: usize, target: DataType) -> Result<(), TableError> {
        if col >= self.table.column_count() {
            return Err(TableError::OutOfBounds { row: 0, col });
        }

        self.history.push_edit(self.table.clone());
        self.table.convert_column(col, target)?;

        tracing::debug!(col, dtype = %target, "converted column");
        self.events.push(ModelEvent::LayoutChanged);
        Ok(())
    }

    /// Tab/newline text for a selection
    pub fn copy(&self, range: SelectionRange) -> String {
        serialize(&self.table, range)
    }

    /// Write a tab/newline block cell by cell starting at `anchor`.
    ///
    /// Each cell goes through `set`; failures are collected and the rest of
    /// the block is still written.
    pub fn paste(&mut self, text: &str, anchor: CellCoord) -> PasteReport {
        let plan = paste_plan(text, anchor, self.row_count(), self.column_count());
        let mut report = PasteReport {
            skipped: plan.skipped,
            ..PasteReport::default()
        };

        for write in plan.writes {
            match self.set(write.coord.row, write.coord.col, &write.text) {
                Ok(()) => report.written += 1,
                Err(err) => report.failures.push((write.coord, err)),
            }
        }

        tracing::debug!(
            written = report.written,
            skipped = report.skipped,
            failed = report.failures.len(),
            "paste"
        );
        report
    }

    /// Column header, with the dtype appended when enabled
    pub fn header(&self, col: usize) -> Option<String> {
        self.table.header(col, self.show_dtypes)
    }

    pub fn row_label(&self, row: usize) -> Option<&str> {
        self.table.row_label(row)
    }

    pub fn show_dtypes(&self) -> bool {
        self.show_dtypes
    }

    pub fn set_show_dtypes(&mut self, show: bool) {
        self.show_dtypes = show;
        if let Some(last) = self.column_count().checked_sub(1) {
            self.events.push(ModelEvent::HeadersChanged { first: 0, last });
        }
    }

    /// Take all notifications queued since the last call
    pub fn drain_events(&mut self) -> Vec<ModelEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feathersheet_core::{CellValue, Column};

    fn people() -> TableModel {
        TableModel::new(
            Table::new(vec![
                Column::ints("id", &[1, 2]),
                Column::strs("name", &["a", "b"]),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn test_set_undo_redo_scenario() {
        let mut model = people();

        model.set(0, 1, "z").unwrap();
        assert_eq!(model.get(0, 1).as_deref(), Some("z"));

        assert!(model.undo());
        assert_eq!(model.get(0, 1).as_deref(), Some("a"));

        assert!(model.redo());
        assert_eq!(model.get(0, 1).as_deref(), Some("z"));
    }

    #[test]
    fn test_round_trip_law() {
        let mut model = people();
        let original = model.table().clone();

        for i in 0..30 {
            model.set(i % 2, 0, &i.to_string()).unwrap();
        }
        let edited = model.table().clone();

        for _ in 0..30 {
            assert!(model.undo());
        }
        assert!(!model.undo());
        assert_eq!(model.table(), &original);

        for _ in 0..30 {
            assert!(model.redo());
        }
        assert!(!model.redo());
        assert_eq!(model.table(), &edited);
    }

    #[test]
    fn test_bounded_history() {
        let mut model = TableModel::new(Table::new(vec![Column::ints("n", &[0])]).unwrap());

        for i in 1..=31 {
            model.set(0, 0, &i.to_string()).unwrap();
        }
        let mut undone = 0;
        while model.undo() {
            undone += 1;
        }

        assert_eq!(undone, 30);
        assert_eq!(model.get(0, 0).as_deref(), Some("1"));
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut model = people();
        model.set(0, 1, "x").unwrap();
        model.undo();
        model.set(1, 1, "y").unwrap();
        assert!(!model.redo());

        model.undo();
        model.change_column_type(0, "float").unwrap();
        assert!(!model.redo());

        model.undo();
        model.paste("q", CellCoord::new(0, 1));
        assert!(!model.redo());
    }

    #[test]
    fn test_failed_set_keeps_table_but_uses_undo_slot() {
        let mut model = people();
        model.set(0, 1, "z").unwrap();
        model.undo();
        let before = model.table().clone();

        let err = model.set(0, 0, "abc").unwrap_err();
        assert_eq!(
            err,
            TableError::Conversion {
                value: "abc".to_string(),
                target: DataType::Int
            }
        );
        assert_eq!(model.table(), &before);
        assert_eq!(model.history().undo_count(), 1);
        assert!(model.can_redo());
    }

    #[test]
    fn test_out_of_bounds_set_is_not_journaled() {
        let mut model = people();
        assert_eq!(
            model.set(5, 0, "1"),
            Err(TableError::OutOfBounds { row: 5, col: 0 })
        );
        assert_eq!(model.set(0, 9, "1"), Err(TableError::OutOfBounds { row: 0, col: 9 }));
        assert!(!model.can_undo());
        assert_eq!(model.get(5, 0), None);
    }

    #[test]
    fn test_numeric_and_timestamp_coercion() {
        let mut model = TableModel::new(
            Table::new(vec![
                Column::floats("x", &[1.0]),
                Column::new("when", DataType::Datetime, vec![CellValue::Null]).unwrap(),
            ])
            .unwrap(),
        );
        model.set(0, 0, "2.5").unwrap();
        assert_eq!(model.get(0, 0).as_deref(), Some("2.5"));

        model.set(0, 1, "2024-02-29 10:00:00").unwrap();
        assert_eq!(model.get(0, 1).as_deref(), Some("2024-02-29 10:00:00"));
        assert!(model.set(0, 1, "someday").is_err());
    }

    #[test]
    fn test_change_column_type() {
        let mut model = people();
        model.change_column_type(0, "str").unwrap();
        assert_eq!(model.dtype(0), Some(DataType::Str));
        assert_eq!(
            model.table().column(0).unwrap().values(),
            &[CellValue::Str("1".into()), CellValue::Str("2".into())]
        );
        assert!(model.undo());
        assert_eq!(model.dtype(0), Some(DataType::Int));
    }

    #[test]
    fn test_change_column_type_coerces_with_nulls() {
        let mut model =
            TableModel::new(Table::new(vec![Column::strs("v", &["1", "x", "3"])]).unwrap());
        model.change_column_type(0, "int").unwrap();
        assert_eq!(
            model.table().column(0).unwrap().values(),
            &[CellValue::Int(1), CellValue::Null, CellValue::Int(3)]
        );
    }

    #[test]
    fn test_unsupported_type_is_not_journaled() {
        let mut model = people();
        assert_eq!(
            model.change_column_type(0, "complex"),
            Err(TableError::UnsupportedType("complex".to_string()))
        );
        assert!(!model.can_undo());
        assert!(model.drain_events().is_empty());
    }

    #[test]
    fn test_copy_paste_round_trip() {
        let mut model = TableModel::new(
            Table::new(vec![
                Column::ints("id", &[1, 2, 3]),
                Column::floats("score", &[0.5, 1.0, 2.0]),
                Column::strs("name", &["a", "b", "c"]),
            ])
            .unwrap(),
        );
        let original = model.table().clone();
        let range = SelectionRange::new(CellCoord::new(0, 0), CellCoord::new(2, 2));

        let text = model.copy(range);
        let report = model.paste(&text, CellCoord::origin());

        assert_eq!(report.written, 9);
        assert!(report.is_clean());
        assert_eq!(model.table(), &original);
    }

    #[test]
    fn test_paste_is_best_effort() {
        let mut model = people();
        let report = model.paste("7\tq\nbad\tr\n9\ts", CellCoord::origin());

        assert_eq!(report.written, 3);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, CellCoord::new(1, 0));
        assert_eq!(model.get(0, 0).as_deref(), Some("7"));
        assert_eq!(model.get(1, 0).as_deref(), Some("2"));
        assert_eq!(model.get(1, 1).as_deref(), Some("r"));
    }

    #[test]
    fn test_events() {
        let mut model = people();
        model.set(1, 0, "5").unwrap();
        model.undo();
        model.set_show_dtypes(true);

        assert_eq!(
            model.drain_events(),
            vec![
                ModelEvent::CellChanged {
                    coord: CellCoord::new(1, 0)
                },
                ModelEvent::LayoutChanged,
                ModelEvent::HeadersChanged { first: 0, last: 1 },
            ]
        );
        assert!(model.drain_events().is_empty());
        assert_eq!(model.header(0).as_deref(), Some("id (int64)"));
    }

    #[test]
    fn test_change_column_type_events() {
        let mut model = people();
        model.change_column_type(0, "float").unwrap();
        assert_eq!(model.drain_events(), vec![ModelEvent::LayoutChanged]);

        assert!(model.change_column_type(0, "complex").is_err());
        assert!(model.change_column_type(7, "int").is_err());
        assert!(model.drain_events().is_empty());
    }
}
