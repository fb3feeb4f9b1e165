use serde::{Deserialize, Serialize};

use crate::domain::entities::Permission;

// Request payload for anonymous sign-in.
#[derive(Debug, Default, Deserialize)]
pub struct AnonymousSignInRequest {
    #[serde(default)]
    pub display_name: Option<String>,
}

// Request payload for registering a durable identity.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

// Request payload for passwordless sign-in to an existing account.
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
}

// Response payload for every sign-in flavour.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user_id: String,
    pub access_token: String,
    pub expires_at: u64,
    pub is_anonymous: bool,
    pub display_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user_id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub is_anonymous: bool,
    pub converted_user_id: Option<String>,
}

// Request payload for exchanging a room code.
#[derive(Debug, Deserialize)]
pub struct JoinRoomRequest {
    pub token: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JoinRoomResponse {
    pub map_id: String,
    pub map_title: String,
    pub permissions: Permission,
    pub is_guest: bool,
    pub current_users: u32,
    pub max_users: u32,
}

// Request payload for issuing a room code.
#[derive(Debug, Deserialize)]
pub struct IssueRoomBody {
    pub map_id: String,
    pub map_title: String,
    pub permissions: Permission,
    pub max_users: u32,
    pub ttl_seconds: u64,
}

#[derive(Debug, Serialize)]
pub struct IssueRoomResponse {
    pub token: String,
    // Presentation form with the separator, e.g. ABC-123.
    pub display_token: String,
    pub expires_at: u64,
}

// Request payload for the guest-to-registered merge.
#[derive(Debug, Deserialize)]
pub struct UpgradeRequest {
    pub guest_user_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpgradeResponse {
    pub converted: bool,
    pub display_name: Option<String>,
    pub reattributed_activity: usize,
    pub reassigned_rooms: usize,
}

#[derive(Debug, Serialize)]
pub struct ActivityEntryResponse {
    pub id: u64,
    pub map_id: String,
    pub user_id: String,
    pub action: String,
    pub created_at: u64,
}

// Simple error envelope for JSON responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}
