use serde::{Deserialize, Serialize};

use crate::domain::room_code::RoomCode;

// Access level granted by a room code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    View,
    Edit,
    Admin,
}

/// Outcome of a successful token exchange. Handed to navigation, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinResult {
    pub map_id: String,
    pub map_title: String,
    pub permissions: Permission,
    pub is_guest: bool,
    pub current_users: u32,
    pub max_users: u32,
}

// Token exchange request; registered identities send no display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenExchange {
    pub code: RoomCode,
    pub display_name: Option<String>,
}

// Guest-to-registered merge request sent as the new identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityUpgrade {
    pub guest_user_id: String,
    // Proposed default when the registered profile has no name yet.
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeReceipt {
    pub converted: bool,
    pub display_name: Option<String>,
    pub reattributed_activity: usize,
}
