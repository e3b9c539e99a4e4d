// 📐 Sheet Schema - fixed room-table layout
// Column map, row-key formula, guest-cell packing and date serials
//
// Layout of every sheet (one sheet per floor, row 0 = header):
//   0 number | 1 price | 2 type | 3 capacity | 4 main guest "name,email,phone,id"
//   5..=7 companion names | 8 start date | 9 end date | 10 additional info
//
// Nothing here touches the filesystem.

use chrono::{Duration, NaiveDate};
use std::fmt;

use crate::entities::Guest;

// ============================================================================
// COLUMNS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    RoomNumber,
    Price,
    RoomType,
    Capacity,
    MainGuest,
    Companion1,
    Companion2,
    Companion3,
    StartDate,
    EndDate,
    AdditionalInfo,
}

impl Column {
    pub const ALL: [Column; 11] = [
        Column::RoomNumber,
        Column::Price,
        Column::RoomType,
        Column::Capacity,
        Column::MainGuest,
        Column::Companion1,
        Column::Companion2,
        Column::Companion3,
        Column::StartDate,
        Column::EndDate,
        Column::AdditionalInfo,
    ];

    /// Zero-based column index in the sheet
    pub fn index(&self) -> u16 {
        match self {
            Column::RoomNumber => 0,
            Column::Price => 1,
            Column::RoomType => 2,
            Column::Capacity => 3,
            Column::MainGuest => 4,
            Column::Companion1 => 5,
            Column::Companion2 => 6,
            Column::Companion3 => 7,
            Column::StartDate => 8,
            Column::EndDate => 9,
            Column::AdditionalInfo => 10,
        }
    }

    /// Header label written in row 0
    pub fn label(&self) -> &'static str {
        match self {
            Column::RoomNumber => "Room Number",
            Column::Price => "Price",
            Column::RoomType => "Type",
            Column::Capacity => "Capacity",
            Column::MainGuest => "Main Guest",
            Column::Companion1 => "Guest 2",
            Column::Companion2 => "Guest 3",
            Column::Companion3 => "Guest 4",
            Column::StartDate => "Start Date",
            Column::EndDate => "End Date",
            Column::AdditionalInfo => "Additional Info",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (column {})", self.label(), self.index())
    }
}

/// Columns holding guests, main bundle first
pub const GUEST_COLUMNS: [Column; 4] = [
    Column::MainGuest,
    Column::Companion1,
    Column::Companion2,
    Column::Companion3,
];

/// Slots for companion names, in write order
pub const COMPANION_COLUMNS: [Column; 3] =
    [Column::Companion1, Column::Companion2, Column::Companion3];

/// Everything check-out wipes (4..=10)
pub const OCCUPANCY_COLUMNS: [Column; 7] = [
    Column::MainGuest,
    Column::Companion1,
    Column::Companion2,
    Column::Companion3,
    Column::StartDate,
    Column::EndDate,
    Column::AdditionalInfo,
];

/// Row 0 of every sheet
pub const HEADER_ROW: u32 = 0;

/// Header labels in column order
pub fn header_labels() -> Vec<&'static str> {
    Column::ALL.iter().map(|c| c.label()).collect()
}

// ============================================================================
// LAYOUT ERRORS
// ============================================================================

/// Failures mapping between rooms and sheet positions
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// Data row with a missing or mistyped cell
    Parse {
        sheet: String,
        row: u32,
        column: Column,
        reason: String,
    },

    /// Room number below 100 has no floor sheet
    InvalidRoomNumber(u32),

    MissingSheet { floor: u32 },

    /// Date a cell cannot hold without being read back as "no date"
    DateOutOfRange { room: u32, date: NaiveDate },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::Parse {
                sheet,
                row,
                column,
                reason,
            } => write!(f, "sheet '{}', row {}, {}: {}", sheet, row, column, reason),
            LayoutError::InvalidRoomNumber(number) => {
                write!(f, "room number {} does not map to a floor sheet", number)
            }
            LayoutError::MissingSheet { floor } => {
                write!(f, "workbook has no sheet for floor {}", floor)
            }
            LayoutError::DateOutOfRange { room, date } => write!(
                f,
                "room {}: date {} is outside the range a workbook can hold",
                room, date
            ),
        }
    }
}

impl std::error::Error for LayoutError {}

// ============================================================================
// ROW KEY
// ============================================================================

/// Where a room lives: sheet index from the floor, row index from the
/// number within the floor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowKey {
    pub sheet: usize,
    pub row: u32,
}

impl RowKey {
    /// Room 305 → sheet 2 (third floor), row 5
    pub fn for_room(number: u32) -> Result<RowKey, LayoutError> {
        let floor = number / 100;
        if floor == 0 {
            return Err(LayoutError::InvalidRoomNumber(number));
        }

        Ok(RowKey {
            sheet: (floor - 1) as usize,
            row: number % 100,
        })
    }

    pub fn floor(&self) -> u32 {
        self.sheet as u32 + 1
    }
}

// ============================================================================
// GUEST CELLS
// ============================================================================

const GUEST_FIELD_SEPARATOR: char = ',';

/// `"name,email,phone,id"` for a main guest; companions are stored as bare names
pub fn pack_guest(guest: &Guest) -> String {
    match guest {
        Guest::Main {
            name,
            email,
            phone,
            id_number,
        } => format!("{},{},{},{}", name, email, phone, id_number),
        Guest::Companion { name } => name.clone(),
    }
}

/// Inverse of [`pack_guest`]: a separator means a full main-guest bundle,
/// otherwise the whole cell is a companion's name
pub fn parse_guest_cell(text: &str) -> Result<Guest, String> {
    if !text.contains(GUEST_FIELD_SEPARATOR) {
        return Ok(Guest::companion(text.trim()));
    }

    let parts: Vec<&str> = text.split(GUEST_FIELD_SEPARATOR).map(str::trim).collect();
    match parts.as_slice() {
        [name, email, phone, id_number] => Ok(Guest::main(*name, *email, *phone, *id_number)),
        _ => Err(format!(
            "expected 'name,email,phone,id' but found {} field(s) in '{}'",
            parts.len(),
            text
        )),
    }
}

// ============================================================================
// DATE SERIALS
// ============================================================================

/// 9999-12-31, the last day the format can represent
pub const MAX_SERIAL: f64 = 2_958_465.0;

fn serial_epoch() -> NaiveDate {
    // 1900-01-01 is always valid
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Last calendar date a date cell can hold (serial [`MAX_SERIAL`])
pub fn last_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(9999, 12, 31).unwrap_or(NaiveDate::MAX)
}

/// True when `date` survives a write then read through a date cell
pub fn is_storable_date(date: NaiveDate) -> bool {
    date_to_serial(date).abs() <= MAX_SERIAL
}

/// Spreadsheet day count → calendar date.
///
/// Day `n` is 1900-01-01 plus `n - 2` days, which reproduces the 1900
/// leap-year quirk for every modern date (43500 → 2019-02-04).
/// Fractional parts (time of day) are dropped.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial.abs() > MAX_SERIAL {
        return None;
    }

    let days = serial.trunc() as i64 - 2;
    serial_epoch().checked_add_signed(Duration::days(days))
}

/// Calendar date → spreadsheet day count (inverse of [`serial_to_date`])
pub fn date_to_serial(date: NaiveDate) -> f64 {
    ((date - serial_epoch()).num_days() + 2) as f64
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_column_indices_are_sequential() {
        for (expected, column) in Column::ALL.iter().enumerate() {
            assert_eq!(column.index() as usize, expected);
        }
        assert_eq!(header_labels().len(), 11);
        assert_eq!(header_labels()[0], "Room Number");
    }

    #[test]
    fn test_occupancy_columns_cover_four_to_ten() {
        let indices: Vec<u16> = OCCUPANCY_COLUMNS.iter().map(|c| c.index()).collect();
        assert_eq!(indices, (4..=10).collect::<Vec<u16>>());

        let companions: Vec<u16> = COMPANION_COLUMNS.iter().map(|c| c.index()).collect();
        assert_eq!(companions, vec![5, 6, 7]);
    }

    #[test]
    fn test_row_key_for_room() {
        assert_eq!(RowKey::for_room(101).unwrap(), RowKey { sheet: 0, row: 1 });
        assert_eq!(RowKey::for_room(305).unwrap(), RowKey { sheet: 2, row: 5 });
        assert_eq!(RowKey::for_room(1299).unwrap(), RowKey { sheet: 11, row: 99 });
        assert_eq!(RowKey::for_room(305).unwrap().floor(), 3);
    }

    #[test]
    fn test_row_key_rejects_ground_floor() {
        assert_eq!(
            RowKey::for_room(42),
            Err(LayoutError::InvalidRoomNumber(42))
        );
    }

    #[test]
    fn test_parse_main_guest_bundle() {
        let guest = parse_guest_cell("Jan Kowalski,jan@x.com,123456789,PESEL1").unwrap();
        assert_eq!(
            guest,
            Guest::main("Jan Kowalski", "jan@x.com", "123456789", "PESEL1")
        );
    }

    #[test]
    fn test_parse_trims_fields() {
        let guest = parse_guest_cell(" Jan , jan@x.com ,123, ID ").unwrap();
        assert_eq!(guest.name(), "Jan");
        assert_eq!(guest.email(), Some("jan@x.com"));
        assert_eq!(guest.id_number(), Some("ID"));
    }

    #[test]
    fn test_parse_plain_name_is_companion() {
        let guest = parse_guest_cell("Widok na morze").unwrap();
        assert_eq!(guest, Guest::companion("Widok na morze"));
    }

    #[test]
    fn test_parse_incomplete_bundle_fails() {
        let err = parse_guest_cell("Jan,jan@x.com").unwrap_err();
        assert!(err.contains("2 field(s)"));
    }

    #[test]
    fn test_pack_then_parse() {
        let main = Guest::main("Jan Kowalski", "jan@x.com", "123456789", "PESEL1");
        assert_eq!(pack_guest(&main), "Jan Kowalski,jan@x.com,123456789,PESEL1");
        assert_eq!(parse_guest_cell(&pack_guest(&main)).unwrap(), main);

        let companion = Guest::companion("Anna");
        assert_eq!(pack_guest(&companion), "Anna");
    }

    #[test]
    fn test_serial_to_date_known_values() {
        assert_eq!(serial_to_date(43500.0), Some(date(2019, 2, 4)));
        assert_eq!(serial_to_date(1.0), Some(date(1899, 12, 31)));
        assert_eq!(serial_to_date(45292.75), Some(date(2024, 1, 1)));
        assert_eq!(serial_to_date(f64::NAN), None);
        assert_eq!(serial_to_date(1e12), None);
    }

    #[test]
    fn test_date_to_serial_is_inverse() {
        for d in [date(2019, 2, 4), date(2023, 1, 1), date(2023, 12, 31), date(2030, 6, 15)] {
            assert_eq!(serial_to_date(date_to_serial(d)), Some(d));
        }
        assert_eq!(date_to_serial(date(2019, 2, 4)), 43500.0);
    }

    #[test]
    fn test_last_date_is_max_serial() {
        assert_eq!(date_to_serial(last_date()), MAX_SERIAL);
        assert_eq!(serial_to_date(MAX_SERIAL), Some(last_date()));
        assert!(is_storable_date(last_date()));
        assert!(!is_storable_date(date(10000, 1, 1)));
    }

    #[test]
    fn test_layout_error_display() {
        let err = LayoutError::Parse {
            sheet: "Floor 1".to_string(),
            row: 3,
            column: Column::Price,
            reason: "expected a number".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "sheet 'Floor 1', row 3, Price (column 1): expected a number"
        );
    }
}
