// Entity Models
//
// Room: structural identity (number) + occupancy that is populated and reset
// Guest: main guest with contact details, or name-only companion

pub mod guest;
pub mod room;

pub use guest::Guest;
pub use room::Room;
