// 🛎️ Front Desk - line-oriented operator console
//
// Reads commands from any BufRead, writes prompts/results to any Write.
// Every mutation goes registry first, then store.update / store.clear;
// nothing is persisted until `save`.

use anyhow::{anyhow, Result};
use chrono::{Days, Local, NaiveDate};
use log::{debug, error};
use regex::Regex;
use std::fmt;
use std::io::{BufRead, Write};
use std::str::FromStr;

use crate::assoc_map::AssocMap;
use crate::entities::Guest;
use crate::schema::{is_storable_date, last_date};
use crate::store::{RoomRegistry, TabularStore};

const EMAIL_PATTERN: &str = r"^[\w.-]+@[\w.-]+\.[a-zA-Z]{2,}$";
const PHONE_PATTERN: &str = r"^(\+\d{2})?\d{3}[- ]?\d{3}[- ]?\d{3}$";
const DATE_PATTERN: &str = r"^\d{4}-\d{2}-\d{2}$";

const HELP_TEXT: &str = "\
Available commands:
 - 'prices'   lists every room with its nightly price
 - 'view'     shows everything about one room
 - 'checkin'  checks guests in to a free room
 - 'checkout' checks guests out and prints the amount due
 - 'list'     lists every room with its occupancy
 - 'save'     writes the current state to the .xlsx file
 - 'exit'     closes the program";

// ============================================================================
// COMMANDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Prices,
    View,
    Checkin,
    Checkout,
    List,
    Save,
    Exit,
    Help,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Prices => "prices",
            Command::View => "view",
            Command::Checkin => "checkin",
            Command::Checkout => "checkout",
            Command::List => "list",
            Command::Save => "save",
            Command::Exit => "exit",
            Command::Help => "help",
        }
    }
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "prices" => Ok(Command::Prices),
            "view" => Ok(Command::View),
            "checkin" => Ok(Command::Checkin),
            "checkout" => Ok(Command::Checkout),
            "list" => Ok(Command::List),
            "save" => Ok(Command::Save),
            "exit" => Ok(Command::Exit),
            "help" => Ok(Command::Help),
            other => Err(format!("unknown command '{}'", other)),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Which rooms a room-number prompt accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoomPick {
    Any,
    Free,
    Occupied,
}

/// Input ended while a prompt was waiting
#[derive(Debug)]
pub struct InputClosed;

impl fmt::Display for InputClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("input closed")
    }
}

impl std::error::Error for InputClosed {}

// ============================================================================
// FRONT DESK
// ============================================================================

pub struct FrontDesk<'a, R, W> {
    store: &'a mut TabularStore,
    rooms: &'a mut RoomRegistry,
    input: R,
    output: W,
    currency: String,
    fixed_today: Option<NaiveDate>,
    email: Regex,
    phone: Regex,
    date: Regex,
}

impl<'a, R: BufRead, W: Write> FrontDesk<'a, R, W> {
    pub fn new(
        store: &'a mut TabularStore,
        rooms: &'a mut RoomRegistry,
        input: R,
        output: W,
        currency: impl Into<String>,
    ) -> Result<Self> {
        Ok(FrontDesk {
            store,
            rooms,
            input,
            output,
            currency: currency.into(),
            fixed_today: None,
            email: Regex::new(EMAIL_PATTERN)?,
            phone: Regex::new(PHONE_PATTERN)?,
            date: Regex::new(DATE_PATTERN)?,
        })
    }

    /// Pin "today" (check-in default date, checkout billing)
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.fixed_today = Some(today);
        self
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn today(&self) -> NaiveDate {
        self.fixed_today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Command loop until `exit` or end of input
    pub fn run(&mut self) -> Result<()> {
        write!(self.output, "Enter command ('help' for available commands): ")?;
        self.output.flush()?;

        while let Some(line) = self.read_line()? {
            let command = match line.parse::<Command>() {
                Ok(command) => command,
                Err(_) => {
                    write!(self.output, "Invalid command. Try again: ")?;
                    self.output.flush()?;
                    continue;
                }
            };

            debug!("Executing '{}'", command);
            match self.execute(command) {
                Ok(Flow::Exit) => break,
                Ok(Flow::Continue) => {}
                Err(e) if e.is::<InputClosed>() => break,
                Err(e) => {
                    error!("Command '{}' failed: {:#}", command, e);
                    writeln!(self.output, "Error: {:#}", e)?;
                }
            }

            write!(self.output, "\nEnter command: ")?;
            self.output.flush()?;
        }

        Ok(())
    }

    pub fn execute(&mut self, command: Command) -> Result<Flow> {
        match command {
            Command::Prices => self.prices()?,
            Command::View => self.view()?,
            Command::Checkin => self.checkin()?,
            Command::Checkout => self.checkout()?,
            Command::List => self.list()?,
            Command::Save => self.save()?,
            Command::Help => writeln!(self.output, "{}", HELP_TEXT)?,
            Command::Exit => return Ok(Flow::Exit),
        }
        Ok(Flow::Continue)
    }

    // ========================================================================
    // COMMANDS
    // ========================================================================

    fn prices(&mut self) -> Result<()> {
        writeln!(self.output, "No.   Type   Price")?;
        for (number, room) in self.rooms.iter() {
            writeln!(
                self.output,
                "{} - {}: {} {}",
                number,
                room.room_type(),
                room.price(),
                self.currency
            )?;
        }
        Ok(())
    }

    fn view(&mut self) -> Result<()> {
        let number = self.read_room_number(RoomPick::Any)?;
        let room = self
            .rooms
            .get(&number)
            .ok_or_else(|| anyhow!("Room {} not found", number))?;

        writeln!(self.output, "{}", room)?;
        if room.is_free() {
            writeln!(self.output, "Room is free.")?;
        } else {
            writeln!(self.output, "Guests in this room:")?;
            for (i, guest) in room.guests().iter().enumerate() {
                writeln!(self.output, "{}. {}", i + 1, guest)?;
            }
        }
        Ok(())
    }

    fn list(&mut self) -> Result<()> {
        for (_, room) in self.rooms.iter() {
            writeln!(self.output, "{}", room)?;
            if !room.is_free() {
                writeln!(self.output, "Guests:")?;
                for guest in room.guests() {
                    writeln!(self.output, "   {}", guest)?;
                }
                writeln!(
                    self.output,
                    "    Stay (YYYY-MM-DD) from {} to {}",
                    format_date(room.start_date()),
                    format_date(room.end_date())
                )?;
            }
        }
        Ok(())
    }

    fn checkin(&mut self) -> Result<()> {
        let number = self.read_room_number(RoomPick::Free)?;
        let capacity = self
            .rooms
            .get(&number)
            .map(|room| room.capacity())
            .ok_or_else(|| anyhow!("Room {} not found", number))?;

        let mut guests = vec![self.read_main_guest()?];

        for _ in 1..capacity {
            let name = self.read_plain_field("Next guest's full name (blank if none): ", true)?;
            if name.is_empty() {
                break;
            }
            guests.push(Guest::companion(name));
        }

        let start = self.read_start_date()?;
        let end = self.read_end_date(start)?;

        let info = self.prompt("Additional information (optional): ")?;
        let info = if info.trim().is_empty() {
            None
        } else {
            Some(info.trim().to_string())
        };

        let room = self
            .rooms
            .get_mut(&number)
            .ok_or_else(|| anyhow!("Room {} not found", number))?;
        room.check_in(guests, start, end, info);
        self.store.update(room)?;

        writeln!(
            self.output,
            "Checked in to room {} from {} to {}.",
            number, start, end
        )?;
        Ok(())
    }

    fn checkout(&mut self) -> Result<()> {
        let number = self.read_room_number(RoomPick::Occupied)?;
        let today = self.today();

        let room = self
            .rooms
            .get_mut(&number)
            .ok_or_else(|| anyhow!("Room {} not found", number))?;
        let amount = room.calculate_price_on(today);

        writeln!(self.output, "Amount due: {} {}", amount, self.currency)?;

        room.clear();
        self.store.clear(room)?;
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        // failure is already logged by the store; tell the operator and carry on
        match self.store.save() {
            Ok(()) => writeln!(self.output, "Changes saved.")?,
            Err(e) => writeln!(self.output, "Could not save changes: {:#}", e)?,
        }
        Ok(())
    }

    // ========================================================================
    // PROMPTS
    // ========================================================================

    /// One line without its terminator, `None` at end of input
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()))
    }

    fn prompt(&mut self, text: &str) -> Result<String> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;
        self.read_line()?.ok_or_else(|| InputClosed.into())
    }

    fn read_room_number(&mut self, pick: RoomPick) -> Result<u32> {
        loop {
            let line = self.prompt("Room number: ")?;
            let number = match line.trim().parse::<u32>() {
                Ok(number) => number,
                Err(_) => {
                    writeln!(self.output, "Enter a valid room number (e.g. 503).")?;
                    continue;
                }
            };

            let free = match self.rooms.get(&number) {
                Some(room) => room.is_free(),
                None => {
                    writeln!(self.output, "Room {} does not exist. Try again.", number)?;
                    continue;
                }
            };

            match (pick, free) {
                (RoomPick::Free, false) => writeln!(
                    self.output,
                    "Room {} is already occupied. Choose another room.",
                    number
                )?,
                (RoomPick::Occupied, true) => writeln!(
                    self.output,
                    "Room {} is free. Choose another room.",
                    number
                )?,
                _ => return Ok(number),
            }
        }
    }

    /// Free text that ends up in a guest cell: commas would break the bundle
    fn read_plain_field(&mut self, text: &str, allow_blank: bool) -> Result<String> {
        loop {
            let value = self.prompt(text)?.trim().to_string();
            if value.contains(',') {
                writeln!(self.output, "Commas are not allowed here. Try again.")?;
            } else if value.is_empty() && !allow_blank {
                writeln!(self.output, "This field is required.")?;
            } else {
                return Ok(value);
            }
        }
    }

    fn read_matching(&mut self, text: &str, pattern: &Regex, complaint: &str) -> Result<String> {
        loop {
            let value = self.prompt(text)?.trim().to_string();
            if pattern.is_match(&value) {
                return Ok(value);
            }
            writeln!(self.output, "{}", complaint)?;
        }
    }

    fn read_main_guest(&mut self) -> Result<Guest> {
        writeln!(self.output, "Main guest details:")?;
        let name = self.read_plain_field("Full name: ", false)?;
        let id_number = self.read_plain_field("National ID / document number: ", false)?;

        let email_pattern = self.email.clone();
        let email = self.read_matching(
            "Email address: ",
            &email_pattern,
            "Invalid email format. Try again.",
        )?;

        let phone_pattern = self.phone.clone();
        let phone = self.read_matching(
            "Phone number: ",
            &phone_pattern,
            "Invalid phone number format. Try again.",
        )?;

        Ok(Guest::main(name, email, phone, id_number))
    }

    /// `YYYY-MM-DD`, blank means today
    fn read_start_date(&mut self) -> Result<NaiveDate> {
        loop {
            let value = self.prompt("Check-in date (YYYY-MM-DD, blank for today): ")?;
            let value = value.trim();

            if value.is_empty() {
                return Ok(self.today());
            }
            if self.date.is_match(value) {
                if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
                    return Ok(date);
                }
            }
            writeln!(self.output, "Invalid date format. Try again.")?;
        }
    }

    /// Nights from `start`, answered as the checkout date. The stay must
    /// end on a day a date cell can hold.
    fn read_end_date(&mut self, start: NaiveDate) -> Result<NaiveDate> {
        loop {
            let value = self.prompt("Length of stay (nights): ")?;
            match value.trim().parse::<u64>() {
                Ok(nights) if nights > 0 => {
                    let end = start
                        .checked_add_days(Days::new(nights))
                        .filter(|end| is_storable_date(*end));
                    match end {
                        Some(end) => return Ok(end),
                        None => writeln!(self.output, "Stay must end by {}.", last_date())?,
                    }
                }
                _ => writeln!(self.output, "Enter a positive whole number.")?,
            }
        }
    }
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}

// ============================================================================
// TESTS
// ============================================================================
