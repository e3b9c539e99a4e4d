// Hotel Desk - Core Library
// Room registry, workbook persistence and the front-desk console

pub mod assoc_map;
pub mod config;
pub mod desk;
pub mod entities;
pub mod schema;
pub mod store;
pub mod workbook;

// Re-export commonly used types
pub use assoc_map::{AssocMap, OrderedMap};
pub use config::DeskConfig;
pub use desk::{Command, Flow, FrontDesk};
pub use entities::{Guest, Room};
pub use schema::{date_to_serial, serial_to_date, Column, LayoutError, RowKey};
pub use store::{RoomRegistry, TabularStore};
pub use workbook::{CellValue, Sheet, Workbook};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
