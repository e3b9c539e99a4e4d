// 🧳 Guest Entity - who is staying in a room
//
// A room's guests are either the single "main" guest holding contact and
// identification details, or name-only companions. The variant IS the
// classification; there is no separate flag that can drift out of sync.

use std::fmt;

// ============================================================================
// GUEST
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guest {
    /// Guest holding the stay's contact/ID details
    Main {
        name: String,
        email: String,
        phone: String,
        id_number: String,
    },

    /// Roommate known by name only
    Companion { name: String },
}

impl Guest {
    pub fn main(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        id_number: impl Into<String>,
    ) -> Self {
        Guest::Main {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            id_number: id_number.into(),
        }
    }

    pub fn companion(name: impl Into<String>) -> Self {
        Guest::Companion { name: name.into() }
    }

    pub fn name(&self) -> &str {
        match self {
            Guest::Main { name, .. } | Guest::Companion { name } => name,
        }
    }

    pub fn is_main(&self) -> bool {
        matches!(self, Guest::Main { .. })
    }

    pub fn email(&self) -> Option<&str> {
        match self {
            Guest::Main { email, .. } => Some(email),
            Guest::Companion { .. } => None,
        }
    }

    pub fn phone(&self) -> Option<&str> {
        match self {
            Guest::Main { phone, .. } => Some(phone),
            Guest::Companion { .. } => None,
        }
    }

    /// National ID / passport number
    pub fn id_number(&self) -> Option<&str> {
        match self {
            Guest::Main { id_number, .. } => Some(id_number),
            Guest::Companion { .. } => None,
        }
    }
}

impl fmt::Display for Guest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Guest::Main {
                name,
                email,
                phone,
                id_number,
            } => write!(
                f,
                "Name: {}, Email: {}, Phone: {}, ID: {}",
                name, email, phone, id_number
            ),
            Guest::Companion { name } => write!(f, "Name: {}", name),
        }
    }
}
