// 💾 Tabular Store - room registry <-> workbook file
//
// Lifecycle: open (file loaded) → load / update / clear / save ... → close.
// `close` consumes the store, so a closed store cannot be used again.
//
// update/clear only touch the in-memory workbook; nothing reaches disk
// until `save`.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};

use crate::assoc_map::{AssocMap, OrderedMap};
use crate::entities::{Guest, Room};
use crate::schema::{
    date_to_serial, is_storable_date, pack_guest, parse_guest_cell, serial_to_date, Column,
    LayoutError, RowKey, COMPANION_COLUMNS, GUEST_COLUMNS, OCCUPANCY_COLUMNS,
};
use crate::workbook::{CellValue, Row, Sheet, Workbook};

/// Every room keyed by number, in sheet-then-row load order
pub type RoomRegistry = OrderedMap<u32, Room>;

// ============================================================================
// TABULAR STORE
// ============================================================================

pub struct TabularStore {
    path: PathBuf,
    workbook: Workbook,
    unsaved_changes: bool,
}

impl TabularStore {
    /// Open an existing workbook. A missing or unreadable file is fatal.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let workbook = Workbook::read_xlsx(&path)
            .with_context(|| format!("Failed to open room workbook {:?}", path))?;

        info!(
            "Opened workbook {:?} ({} floor sheet(s))",
            path,
            workbook.sheet_count()
        );

        Ok(TabularStore {
            path,
            workbook,
            unsaved_changes: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read-only view of the in-memory cells
    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved_changes
    }

    // ========================================================================
    // LOAD
    // ========================================================================

    /// Build the registry from every sheet and every data row that has a
    /// room number. Fails on the first malformed row.
    pub fn load(&self) -> Result<RoomRegistry> {
        let mut rooms = RoomRegistry::new();

        for sheet in self.workbook.sheets() {
            for (index, row) in sheet.data_rows() {
                match row.cell(Column::RoomNumber.index()) {
                    None => continue,
                    Some(cell) if cell.is_blank() => continue,
                    Some(_) => {}
                }

                let room = read_room(sheet, index, row)?;
                let number = room.number();
                if rooms.contains(&number) {
                    warn!(
                        "Room {} appears more than once (sheet '{}', row {}); keeping the last",
                        number,
                        sheet.name(),
                        index
                    );
                }
                if !rooms.put(number, room) {
                    anyhow::bail!("Failed to register room {}", number);
                }
            }
        }

        info!("Loaded {} room(s) from {:?}", rooms.len(), self.path);
        Ok(rooms)
    }

    // ========================================================================
    // UPDATE / CLEAR
    // ========================================================================

    /// Project a room's occupancy (guests, dates, info) into its row
    pub fn update(&mut self, room: &Room) -> Result<()> {
        for date in [room.start_date(), room.end_date()].into_iter().flatten() {
            if !is_storable_date(date) {
                return Err(LayoutError::DateOutOfRange {
                    room: room.number(),
                    date,
                }
                .into());
            }
        }

        let row = self.row_for(room.number())?;

        // Guest slots are rewritten from scratch so a smaller party
        // does not leave names behind
        for column in GUEST_COLUMNS {
            row.remove(column.index());
        }

        let mut companions = COMPANION_COLUMNS.into_iter();
        for guest in room.guests() {
            match guest {
                Guest::Main { .. } => {
                    row.set(Column::MainGuest.index(), CellValue::Text(pack_guest(guest)));
                }
                Guest::Companion { name } => match companions.next() {
                    Some(column) => row.set(column.index(), CellValue::Text(name.clone())),
                    None => warn!(
                        "Room {}: no column left for guest '{}', not stored",
                        room.number(),
                        name
                    ),
                },
            }
        }

        write_date(row, Column::StartDate, room.start_date());
        write_date(row, Column::EndDate, room.end_date());

        match room.additional_info() {
            Some(info) => row.set(
                Column::AdditionalInfo.index(),
                CellValue::Text(info.to_string()),
            ),
            None => {
                row.remove(Column::AdditionalInfo.index());
            }
        }

        self.unsaved_changes = true;
        debug!("Updated room {} ({} guest(s))", room.number(), room.guests().len());
        Ok(())
    }

    /// Remove (not blank) every occupancy cell of the room's row
    pub fn clear(&mut self, room: &Room) -> Result<()> {
        let row = self.row_for(room.number())?;

        for column in OCCUPANCY_COLUMNS {
            row.remove(column.index());
        }

        self.unsaved_changes = true;
        debug!("Cleared room {}", room.number());
        Ok(())
    }

    fn row_for(&mut self, number: u32) -> Result<&mut Row> {
        let key = RowKey::for_room(number)?;

        let sheet = self
            .workbook
            .sheet_mut(key.sheet)
            .ok_or(LayoutError::MissingSheet { floor: key.floor() })?;

        Ok(sheet.row_mut(key.row))
    }

    // ========================================================================
    // SAVE / CLOSE
    // ========================================================================

    /// Write the whole workbook back to its original path.
    ///
    /// A failure is logged and returned; the in-memory state is untouched
    /// so the caller can retry.
    pub fn save(&mut self) -> Result<()> {
        match self.workbook.write_xlsx(&self.path) {
            Ok(()) => {
                self.unsaved_changes = false;
                info!("Saved workbook {:?}", self.path);
                Ok(())
            }
            Err(e) => {
                error!("Saving {:?} failed: {:#}", self.path, e);
                Err(e)
            }
        }
    }

    /// End the session. Unsaved edits are dropped (with a warning).
    pub fn close(self) -> Result<()> {
        if self.unsaved_changes {
            warn!("Closing {:?} with unsaved changes", self.path);
        }
        info!("Closed workbook {:?}", self.path);
        Ok(())
    }
}

// ============================================================================
// ROW PARSING
// ============================================================================

fn parse_error(sheet: &Sheet, row: u32, column: Column, reason: impl Into<String>) -> LayoutError {
    LayoutError::Parse {
        sheet: sheet.name().to_string(),
        row,
        column,
        reason: reason.into(),
    }
}

fn read_number(sheet: &Sheet, index: u32, row: &Row, column: Column) -> Result<f64, LayoutError> {
    match row.cell(column.index()) {
        Some(CellValue::Number(n)) => Ok(*n),
        Some(CellValue::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| parse_error(sheet, index, column, format!("'{}' is not a number", s))),
        Some(other) => Err(parse_error(
            sheet,
            index,
            column,
            format!("expected a number, found {:?}", other),
        )),
        None => Err(parse_error(sheet, index, column, "required cell is missing")),
    }
}

fn read_whole(sheet: &Sheet, index: u32, row: &Row, column: Column) -> Result<i64, LayoutError> {
    let value = read_number(sheet, index, row, column)?;
    if value.fract() != 0.0 {
        return Err(parse_error(
            sheet,
            index,
            column,
            format!("expected a whole number, found {}", value),
        ));
    }
    Ok(value as i64)
}

fn read_unsigned(sheet: &Sheet, index: u32, row: &Row, column: Column) -> Result<u32, LayoutError> {
    let value = read_whole(sheet, index, row, column)?;
    u32::try_from(value).map_err(|_| {
        parse_error(
            sheet,
            index,
            column,
            format!("{} is out of range", value),
        )
    })
}

fn read_text(sheet: &Sheet, index: u32, row: &Row, column: Column) -> Result<String, LayoutError> {
    match row.cell(column.index()) {
        Some(CellValue::Text(s)) => Ok(s.clone()),
        Some(other) => Err(parse_error(
            sheet,
            index,
            column,
            format!("expected text, found {:?}", other),
        )),
        None => Err(parse_error(sheet, index, column, "required cell is missing")),
    }
}

fn read_room(sheet: &Sheet, index: u32, row: &Row) -> Result<Room, LayoutError> {
    let number = read_unsigned(sheet, index, row, Column::RoomNumber)?;
    let price = read_whole(sheet, index, row, Column::Price)?;
    let room_type = read_text(sheet, index, row, Column::RoomType)?;
    let capacity = read_unsigned(sheet, index, row, Column::Capacity)?;

    let mut room = Room::new(number, price, room_type, capacity);

    let mut guests = Vec::new();
    for column in GUEST_COLUMNS {
        let text = match row.cell(column.index()) {
            None => continue,
            Some(cell) if cell.is_blank() => continue,
            Some(CellValue::Text(s)) => s,
            Some(other) => {
                return Err(parse_error(
                    sheet,
                    index,
                    column,
                    format!("expected guest text, found {:?}", other),
                ))
            }
        };

        let guest = parse_guest_cell(text).map_err(|reason| parse_error(sheet, index, column, reason))?;
        guests.push(guest);
    }
    room.set_guests(guests);

    room.set_start_date(read_date(row, Column::StartDate));
    room.set_end_date(read_date(row, Column::EndDate));
    room.set_additional_info(
        row.cell(Column::AdditionalInfo.index())
            .filter(|cell| !cell.is_blank())
            .and_then(|cell| cell.as_text())
            .map(str::to_string),
    );

    Ok(room)
}

/// Absent or non-numeric cells read as "no date"
fn read_date(row: &Row, column: Column) -> Option<NaiveDate> {
    row.cell(column.index())
        .and_then(|cell| cell.as_f64())
        .and_then(serial_to_date)
}

fn write_date(row: &mut Row, column: Column, date: Option<NaiveDate>) {
    match date {
        Some(date) => row.set(column.index(), CellValue::Date(date_to_serial(date))),
        None => {
            row.remove(column.index());
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
