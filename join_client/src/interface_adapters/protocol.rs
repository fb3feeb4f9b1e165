use serde::{Deserialize, Serialize};

use crate::domain::identity::{Profile, Session};
use crate::domain::join::{JoinResult, Permission, UpgradeReceipt};

// Payload sent when creating an anonymous session.
#[derive(Debug, Serialize)]
pub struct AnonymousSignInRequest<'a> {
    pub display_name: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct SignInRequest<'a> {
    pub email: &'a str,
}

// Session payload returned by every sign-in route.
#[derive(Debug, Deserialize)]
pub struct SessionResponse {
    pub user_id: String,
    pub access_token: String,
    pub expires_at: u64,
    pub is_anonymous: bool,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl From<SessionResponse> for Session {
    fn from(value: SessionResponse) -> Self {
        Session {
            user_id: value.user_id,
            access_token: value.access_token,
            is_anonymous: value.is_anonymous,
            display_name: value.display_name,
            expires_at: value.expires_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ProfileResponse {
    pub user_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub is_anonymous: bool,
    #[serde(default)]
    pub converted_user_id: Option<String>,
}

impl From<ProfileResponse> for Profile {
    fn from(value: ProfileResponse) -> Self {
        Profile {
            user_id: value.user_id,
            display_name: value.display_name,
            email: value.email,
            avatar_url: value.avatar_url,
            is_anonymous: value.is_anonymous,
            converted_user_id: value.converted_user_id,
        }
    }
}

// Token exchange payload; the code is always canonical on the wire.
#[derive(Debug, Serialize)]
pub struct JoinRoomRequest<'a> {
    pub token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub struct JoinRoomResponse {
    pub map_id: String,
    pub map_title: String,
    pub permissions: Permission,
    pub is_guest: bool,
    pub current_users: u32,
    pub max_users: u32,
}

impl From<JoinRoomResponse> for JoinResult {
    fn from(value: JoinRoomResponse) -> Self {
        JoinResult {
            map_id: value.map_id,
            map_title: value.map_title,
            permissions: value.permissions,
            is_guest: value.is_guest,
            current_users: value.current_users,
            max_users: value.max_users,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UpgradeRequest<'a> {
    pub guest_user_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub struct UpgradeResponse {
    pub converted: bool,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub reattributed_activity: usize,
}

impl From<UpgradeResponse> for UpgradeReceipt {
    fn from(value: UpgradeResponse) -> Self {
        UpgradeReceipt {
            converted: value.converted,
            display_name: value.display_name,
            reattributed_activity: value.reattributed_activity,
        }
    }
}

// Error envelope returned by every backend route.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}
