use serde::Serialize;
use std::fmt;

pub const ROOM_CODE_LEN: usize = 6;
const SEPARATOR: char = '-';
// Presentation form splits the code after this many characters.
const SEPARATOR_AT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("room code contains {0:?}; only letters, digits and '-' are allowed")]
    InvalidCharacter(char),
    #[error("room code must have 6 letters or digits, found {0}")]
    WrongLength(usize),
}

impl FormatError {
    pub fn user_message(&self) -> &'static str {
        "Invalid room code format"
    }
}

/// A validated room code in canonical form: six characters from `[A-Z0-9]`.
///
/// `as_str` yields the canonical form sent over the wire; `Display` yields
/// the separated presentation form (`ABC-123`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Validates human input. Surrounding whitespace is ignored; anything
    /// other than ASCII letters, digits and separators is rejected.
    pub fn parse(raw: &str) -> Result<Self, FormatError> {
        let trimmed = raw.trim();
        if let Some(bad) = trimmed
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && *c != SEPARATOR)
        {
            return Err(FormatError::InvalidCharacter(bad));
        }

        let canonical = normalize(trimmed);
        if canonical.len() != ROOM_CODE_LEN {
            return Err(FormatError::WrongLength(canonical.len()));
        }

        Ok(Self(canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (head, tail) = self.0.split_at(SEPARATOR_AT);
        write!(f, "{head}{SEPARATOR}{tail}")
    }
}

/// Strips every non-alphanumeric character and uppercases the rest.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Re-formats partial input for display while the user types: at most six
/// characters, with the separator once the fourth character appears.
pub fn format_for_display(raw: &str) -> String {
    let code: String = normalize(raw).chars().take(ROOM_CODE_LEN).collect();
    if code.len() <= SEPARATOR_AT {
        return code;
    }
    let (head, tail) = code.split_at(SEPARATOR_AT);
    format!("{head}{SEPARATOR}{tail}")
}
