// 🛏️ Room Entity - structural identity + mutable occupancy
//
// Number, price, type and capacity are fixed at load time.
// Guests, stay dates and notes change with check-in / check-out.

use chrono::{Local, NaiveDate};
use std::fmt;

use super::guest::Guest;

// ============================================================================
// ROOM
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    // ========================================================================
    // STRUCTURE (never changes after load)
    // ========================================================================
    number: u32,

    /// Per-night rate
    price: i64,

    /// Free-text category ("Standard", "Deluxe", ...)
    room_type: String,

    /// Max occupants
    capacity: u32,

    // ========================================================================
    // OCCUPANCY (empty / None while vacant)
    // ========================================================================
    guests: Vec<Guest>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    additional_info: Option<String>,
}

impl Room {
    /// Create a vacant room
    pub fn new(number: u32, price: i64, room_type: impl Into<String>, capacity: u32) -> Self {
        Room {
            number,
            price,
            room_type: room_type.into(),
            capacity,
            guests: Vec::new(),
            start_date: None,
            end_date: None,
            additional_info: None,
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn price(&self) -> i64 {
        self.price
    }

    pub fn room_type(&self) -> &str {
        &self.room_type
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Hundreds digit of the room number (room 305 is on floor 3)
    pub fn floor(&self) -> u32 {
        self.number / 100
    }

    pub fn guests(&self) -> &[Guest] {
        &self.guests
    }

    pub fn main_guest(&self) -> Option<&Guest> {
        self.guests.iter().find(|g| g.is_main())
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    pub fn additional_info(&self) -> Option<&str> {
        self.additional_info.as_deref()
    }

    pub fn set_guests(&mut self, guests: Vec<Guest>) {
        self.guests = guests;
    }

    pub fn set_start_date(&mut self, date: Option<NaiveDate>) {
        self.start_date = date;
    }

    pub fn set_end_date(&mut self, date: Option<NaiveDate>) {
        self.end_date = date;
    }

    pub fn set_additional_info(&mut self, info: Option<String>) {
        self.additional_info = info;
    }

    /// Populate every occupancy field at once
    pub fn check_in(
        &mut self,
        guests: Vec<Guest>,
        start: NaiveDate,
        end: NaiveDate,
        additional_info: Option<String>,
    ) {
        debug_assert!(start <= end, "stay must not end before it starts");
        self.guests = guests;
        self.start_date = Some(start);
        self.end_date = Some(end);
        self.additional_info = additional_info;
    }

    /// Reset occupancy (guests, dates, info). Idempotent.
    pub fn clear(&mut self) {
        self.guests.clear();
        self.start_date = None;
        self.end_date = None;
        self.additional_info = None;
    }

    pub fn is_free(&self) -> bool {
        self.guests.is_empty()
    }

    /// Planned stay length in nights, when both dates are known
    pub fn nights(&self) -> Option<i64> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Some((end - start).num_days()),
            _ => None,
        }
    }

    /// Amount due as of today's local date. See [`Room::calculate_price_on`].
    ///
    /// # Panics
    /// When the room has no start date (vacant room).
    pub fn calculate_price(&self) -> i64 {
        self.calculate_price_on(Local::now().date_naive())
    }

    /// Nights elapsed since the start date times the rate, never less than one night.
    ///
    /// Billing follows elapsed nights, not the planned `end_date`.
    ///
    /// # Panics
    /// When the room has no start date. Callers check [`Room::is_free`] first.
    pub fn calculate_price_on(&self, today: NaiveDate) -> i64 {
        let start = self
            .start_date
            .unwrap_or_else(|| panic!("room {} has no start date to bill from", self.number));

        let elapsed = (today - start).num_days().max(0);
        self.price.max(elapsed * self.price)
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Room {}, price: {}, type: {}, {}-person",
            self.number, self.price, self.room_type, self.capacity
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn deluxe() -> Room {
        Room::new(101, 200, "Deluxe", 2)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_room_is_free() {
        let room = deluxe();
        assert!(room.is_free());
        assert_eq!(room.start_date(), None);
        assert_eq!(room.floor(), 1);
    }

    #[test]
    fn test_occupied_room_is_not_free() {
        let mut room = deluxe();
        room.set_guests(vec![Guest::companion("Jan Kowalski")]);
        assert!(!room.is_free());
    }

    #[test]
    fn test_calculate_price_three_nights() {
        let mut room = deluxe();
        let today = date(2024, 5, 10);
        room.set_start_date(Some(today - Duration::days(3)));

        assert_eq!(room.calculate_price_on(today), 600);
    }

    #[test]
    fn test_calculate_price_same_day_is_one_night() {
        let mut room = deluxe();
        let today = date(2024, 5, 10);
        room.set_start_date(Some(today));

        assert_eq!(room.calculate_price_on(today), 200);
    }

    #[test]
    fn test_calculate_price_future_start_is_one_night() {
        let mut room = deluxe();
        let today = date(2024, 5, 10);
        room.set_start_date(Some(today + Duration::days(4)));

        assert_eq!(room.calculate_price_on(today), 200);
    }

    #[test]
    fn test_calculate_price_ignores_end_date() {
        let mut room = deluxe();
        let today = date(2024, 5, 10);
        room.check_in(
            vec![Guest::companion("A")],
            today - Duration::days(5),
            today - Duration::days(4),
            None,
        );

        assert_eq!(room.calculate_price_on(today), 1000);
    }

    #[test]
    fn test_calculate_price_uses_local_today() {
        let mut room = deluxe();
        room.set_start_date(Some(Local::now().date_naive() - Duration::days(3)));

        assert_eq!(room.calculate_price(), 600);
    }

    #[test]
    #[should_panic(expected = "no start date")]
    fn test_calculate_price_without_start_date_panics() {
        deluxe().calculate_price_on(date(2024, 1, 1));
    }

    #[test]
    fn test_clear_resets_occupancy() {
        let mut room = deluxe();
        let today = date(2024, 5, 10);
        room.check_in(
            vec![Guest::main("John Doe", "j@d.com", "123456789", "X1")],
            today,
            today + Duration::days(2),
            Some("Some info".to_string()),
        );
        assert_eq!(room.nights(), Some(2));
        assert!(room.main_guest().is_some());

        room.clear();

        assert!(room.guests().is_empty());
        assert!(room.is_free());
        assert_eq!(room.start_date(), None);
        assert_eq!(room.end_date(), None);
        assert_eq!(room.additional_info(), None);

        // idempotent
        room.clear();
        assert!(room.is_free());
        assert_eq!(room.price(), 200);
        assert_eq!(room.room_type(), "Deluxe");
    }

    #[test]
    fn test_display() {
        assert_eq!(
            deluxe().to_string(),
            "Room 101, price: 200, type: Deluxe, 2-person"
        );
    }
}
