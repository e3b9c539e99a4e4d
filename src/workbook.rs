// 📒 Workbook - in-memory multi-sheet cell model
// Read from .xlsx with calamine, written back with rust_xlsxwriter
//
// The whole file is held in memory while the desk is open; edits land here
// and only reach disk on `write_xlsx`.

use anyhow::{Context, Result};
use calamine::{open_workbook, Data, Reader, Xlsx};
use log::{debug, warn};
use rust_xlsxwriter::Format;
use std::collections::BTreeMap;
use std::path::Path;

use crate::schema::HEADER_ROW;

/// Number format applied to date cells on write
const DATE_NUM_FORMAT: &str = "yyyy-mm-dd";

// ============================================================================
// CELL VALUE
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    /// Date-serial day count
    Date(f64),
    Bool(bool),
}

impl CellValue {
    /// Numeric payload of number and date cells
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) | CellValue::Date(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Empty text counts as blank
    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.trim().is_empty())
    }
}

// ============================================================================
// ROW
// ============================================================================

/// Sparse row: only cells that exist are stored
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: BTreeMap<u16, CellValue>,
}

impl Row {
    pub fn cell(&self, col: u16) -> Option<&CellValue> {
        self.cells.get(&col)
    }

    /// Create the cell if needed, overwrite otherwise
    pub fn set(&mut self, col: u16, value: CellValue) {
        self.cells.insert(col, value);
    }

    /// Remove the cell entirely (not just blank it)
    pub fn remove(&mut self, col: u16) -> Option<CellValue> {
        self.cells.remove(&col)
    }

    pub fn cells(&self) -> impl Iterator<Item = (u16, &CellValue)> {
        self.cells.iter().map(|(col, value)| (*col, value))
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

// ============================================================================
// SHEET
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    rows: BTreeMap<u32, Row>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Sheet {
            name: name.into(),
            rows: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn row(&self, index: u32) -> Option<&Row> {
        self.rows.get(&index)
    }

    /// Get-or-create
    pub fn row_mut(&mut self, index: u32) -> &mut Row {
        self.rows.entry(index).or_default()
    }

    /// All rows in index order
    pub fn rows(&self) -> impl Iterator<Item = (u32, &Row)> {
        self.rows.iter().map(|(index, row)| (*index, row))
    }

    /// Rows after the header, in index order
    pub fn data_rows(&self) -> impl Iterator<Item = (u32, &Row)> {
        self.rows().filter(|(index, _)| *index != HEADER_ROW)
    }
}

// ============================================================================
// WORKBOOK
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Workbook { sheets: Vec::new() }
    }

    pub fn add_sheet(&mut self, sheet: Sheet) -> &mut Sheet {
        self.sheets.push(sheet);
        let last = self.sheets.len() - 1;
        &mut self.sheets[last]
    }

    pub fn sheet(&self, index: usize) -> Option<&Sheet> {
        self.sheets.get(index)
    }

    pub fn sheet_mut(&mut self, index: usize) -> Option<&mut Sheet> {
        self.sheets.get_mut(index)
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn sheets(&self) -> impl Iterator<Item = &Sheet> {
        self.sheets.iter()
    }

    /// Load every sheet of an .xlsx file, keeping sheet order
    pub fn read_xlsx<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut source: Xlsx<_> = open_workbook(path)
            .with_context(|| format!("Failed to open workbook: {:?}", path))?;

        let mut workbook = Workbook::new();

        for name in source.sheet_names() {
            let range = source
                .worksheet_range(&name)
                .with_context(|| format!("Failed to read sheet '{}' in {:?}", name, path))?;

            let mut sheet = Sheet::new(name.clone());
            let (first_row, first_col) = range.start().unwrap_or((0, 0));

            for (r, c, data) in range.cells() {
                let row = first_row + r as u32;
                let col = (first_col as usize + c) as u16;

                if let Some(value) = convert_cell(data, &name, row, col) {
                    sheet.row_mut(row).set(col, value);
                }
            }

            debug!("Read sheet '{}' ({} rows)", name, sheet.rows.len());
            workbook.add_sheet(sheet);
        }

        Ok(workbook)
    }

    /// Serialize every sheet to `path`, overwriting it
    pub fn write_xlsx<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut out = rust_xlsxwriter::Workbook::new();
        let date_format = Format::new().set_num_format(DATE_NUM_FORMAT);

        for sheet in &self.sheets {
            let worksheet = out.add_worksheet();
            worksheet
                .set_name(sheet.name())
                .with_context(|| format!("Invalid sheet name '{}'", sheet.name()))?;

            for (r, row) in sheet.rows() {
                for (c, value) in row.cells() {
                    match value {
                        CellValue::Number(n) => {
                            worksheet.write_number(r, c, *n)?;
                        }
                        CellValue::Text(s) => {
                            worksheet.write_string(r, c, s)?;
                        }
                        CellValue::Date(serial) => {
                            worksheet.write_number_with_format(r, c, *serial, &date_format)?;
                        }
                        CellValue::Bool(b) => {
                            worksheet.write_boolean(r, c, *b)?;
                        }
                    }
                }
            }
        }

        out.save(path)
            .with_context(|| format!("Failed to write workbook: {:?}", path))?;

        Ok(())
    }
}

fn convert_cell(data: &Data, sheet: &str, row: u32, col: u16) -> Option<CellValue> {
    match data {
        Data::Int(i) => Some(CellValue::Number(*i as f64)),
        Data::Float(f) => Some(CellValue::Number(*f)),
        Data::String(s) => Some(CellValue::Text(s.clone())),
        Data::Bool(b) => Some(CellValue::Bool(*b)),
        Data::DateTime(dt) => Some(CellValue::Date(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(CellValue::Text(s.clone())),
        Data::Error(e) => {
            warn!("Skipping error cell {:?} at sheet '{}' ({}, {})", e, sheet, row, col);
            None
        }
        Data::Empty => None,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("workbook-test-{}.xlsx", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_row_set_overwrite_remove() {
        let mut row = Row::default();
        row.set(4, CellValue::Text("a".to_string()));
        row.set(4, CellValue::Text("b".to_string()));
        assert_eq!(row.cell(4), Some(&CellValue::Text("b".to_string())));

        assert_eq!(row.remove(4), Some(CellValue::Text("b".to_string())));
        assert_eq!(row.cell(4), None);
        assert_eq!(row.remove(4), None);
        assert!(row.is_empty());
    }

    #[test]
    fn test_data_rows_skip_header() {
        let mut sheet = Sheet::new("Floor 1");
        sheet.row_mut(0).set(0, CellValue::Text("Room Number".to_string()));
        sheet.row_mut(2).set(0, CellValue::Number(102.0));
        sheet.row_mut(1).set(0, CellValue::Number(101.0));

        let indices: Vec<u32> = sheet.data_rows().map(|(i, _)| i).collect();
        assert_eq!(indices, vec![1, 2]);
    }

    #[test]
    fn test_cell_value_accessors() {
        assert_eq!(CellValue::Number(2.0).as_f64(), Some(2.0));
        assert_eq!(CellValue::Date(43500.0).as_f64(), Some(43500.0));
        assert_eq!(CellValue::Text("x".to_string()).as_f64(), None);
        assert_eq!(CellValue::Text("x".to_string()).as_text(), Some("x"));
        assert!(CellValue::Text("  ".to_string()).is_blank());
        assert!(!CellValue::Number(0.0).is_blank());
    }

    #[test]
    fn test_write_then_read_xlsx() {
        let path = temp_path();

        let mut workbook = Workbook::new();
        let first = workbook.add_sheet(Sheet::new("Floor 1"));
        first.row_mut(0).set(0, CellValue::Text("Room Number".to_string()));
        first.row_mut(1).set(0, CellValue::Number(101.0));
        first.row_mut(1).set(2, CellValue::Text("Standard".to_string()));
        first.row_mut(1).set(8, CellValue::Date(43500.0));
        first.row_mut(1).set(9, CellValue::Bool(true));
        let second = workbook.add_sheet(Sheet::new("Floor 2"));
        second.row_mut(3).set(1, CellValue::Number(300.0));

        workbook.write_xlsx(&path).unwrap();
        let read = Workbook::read_xlsx(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(read.sheet_count(), 2);
        assert_eq!(read.sheet(0).unwrap().name(), "Floor 1");
        assert_eq!(read.sheet(1).unwrap().name(), "Floor 2");

        let row = read.sheet(0).unwrap().row(1).unwrap();
        assert_eq!(row.cell(0).and_then(|c| c.as_f64()), Some(101.0));
        assert_eq!(row.cell(2).and_then(|c| c.as_text()), Some("Standard"));
        // only values and the date format survive a rewrite
        assert_eq!(row.cell(8), Some(&CellValue::Date(43500.0)));
        assert_eq!(row.cell(9), Some(&CellValue::Bool(true)));
        assert_eq!(row.cell(5), None);

        // absolute coordinates survive a range that does not start at A1
        let row = read.sheet(1).unwrap().row(3).unwrap();
        assert_eq!(row.cell(1).and_then(|c| c.as_f64()), Some(300.0));
    }

    #[test]
    fn test_read_missing_file_fails() {
        let result = Workbook::read_xlsx(temp_path());
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Failed to open workbook"));
    }
}
