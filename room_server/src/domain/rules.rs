use rand::Rng;

use crate::domain::entities::RoomShare;
use crate::domain::errors::RoomError;

pub const ROOM_CODE_LEN: usize = 6;

// Issued codes avoid glyphs that read alike (0/O, 1/I); any [A-Z0-9] code is accepted.
const ISSUE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

const DISPLAY_NAME_MAX_LEN: usize = 32;

/// Canonicalizes a submitted room code: surrounding whitespace is ignored,
/// separators are dropped, letters are uppercased.
pub fn canonical_room_code(raw: &str) -> Result<String, RoomError> {
    let trimmed = raw.trim();
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(RoomError::MalformedRoomCode);
    }

    let code: String = trimmed
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if code.len() != ROOM_CODE_LEN {
        return Err(RoomError::MalformedRoomCode);
    }

    Ok(code)
}

pub fn generate_room_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..ROOM_CODE_LEN)
        .map(|_| ISSUE_ALPHABET[rng.random_range(0..ISSUE_ALPHABET.len())] as char)
        .collect()
}

// Placeholder name handed to guests who did not pick one.
pub fn default_guest_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("User {}", rng.random_range(1000..10000))
}

pub fn validate_display_name(value: &str) -> Result<String, RoomError> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();

    if !(1..=DISPLAY_NAME_MAX_LEN).contains(&len) {
        return Err(RoomError::InvalidDisplayName);
    }
    if trimmed.chars().any(char::is_control) {
        return Err(RoomError::InvalidDisplayName);
    }

    Ok(trimmed.to_string())
}

pub fn validate_email(value: &str) -> Result<String, RoomError> {
    let email = value.trim();
    if email.len() > 254 || email.chars().any(char::is_whitespace) {
        return Err(RoomError::InvalidEmail);
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') && !domain.contains('@') => {
            Ok(email.to_ascii_lowercase())
        }
        _ => Err(RoomError::InvalidEmail),
    }
}

/// Admits `user_id` into the room, returning whether a new seat was taken.
///
/// Re-joining participants never consume a second seat, so a repeated join
/// succeeds even when the room is otherwise full.
pub fn admit(room: &mut RoomShare, user_id: &str, now: u64) -> Result<bool, RoomError> {
    if !room.is_active || room.expires_at <= now {
        return Err(RoomError::RoomExpired);
    }
    if room.participants.iter().any(|id| id == user_id) {
        return Ok(false);
    }
    if room.current_users() >= room.max_users {
        return Err(RoomError::RoomFull);
    }

    room.participants.push(user_id.to_string());
    Ok(true)
}
