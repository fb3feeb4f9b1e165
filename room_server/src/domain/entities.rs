use serde::{Deserialize, Serialize};

// Access level a room code grants on its target map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    View,
    Edit,
    Admin,
}

// Authenticated session keyed by its access token.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub is_anonymous: bool,
    pub expires_at: u64,
}

// Durable profile for both guest and registered identities.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub is_anonymous: bool,
    // Set once a guest has been upgraded; the guest record is kept.
    pub converted_user_id: Option<String>,
    pub created_at: u64,
}

// A shareable room code and the map access it grants.
#[derive(Clone, Debug, PartialEq)]
pub struct RoomShare {
    pub token: String,
    pub map_id: String,
    pub map_title: String,
    pub permissions: Permission,
    pub max_users: u32,
    pub participants: Vec<String>,
    pub expires_at: u64,
    pub is_active: bool,
    pub created_by: String,
}

impl RoomShare {
    pub fn current_users(&self) -> u32 {
        self.participants.len() as u32
    }
}

// Attributed action on a map, re-attributed on identity upgrade.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: u64,
    pub map_id: String,
    pub user_id: String,
    pub action: String,
    pub created_at: u64,
}
