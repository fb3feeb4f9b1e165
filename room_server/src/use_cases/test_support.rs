use async_trait::async_trait;

use crate::domain::entities::{ActivityEntry, Permission, Profile, RoomShare, Session};
use crate::domain::errors::RoomError;
use crate::domain::ports::{ActivityLog, Clock, ProfileStore, RoomStore, SessionStore};
use crate::interface_adapters::state::AppState;

pub(crate) const NOW: u64 = 1_700_000_000;

// Shared fixed time source for deterministic use-case tests.
pub(crate) struct FixedClock(pub(crate) u64);

impl Clock for FixedClock {
    fn now_epoch_seconds(&self) -> u64 {
        self.0
    }
}

// Store double whose every call fails, for error-mapping tests.
#[derive(Clone, Copy)]
pub(crate) struct FailingStore;

#[async_trait]
impl SessionStore for FailingStore {
    async fn insert(&self, _token: String, _session: Session) -> Result<(), String> {
        Err("insert failed".to_string())
    }

    async fn get(&self, _token: &str) -> Result<Option<Session>, String> {
        Err("get failed".to_string())
    }

    async fn remove(&self, _token: &str) -> Result<bool, String> {
        Err("remove failed".to_string())
    }
}

#[async_trait]
impl ProfileStore for FailingStore {
    async fn upsert(&self, _profile: Profile) -> Result<(), String> {
        Err("upsert failed".to_string())
    }

    async fn get(&self, _user_id: &str) -> Result<Option<Profile>, String> {
        Err("get failed".to_string())
    }

    async fn find_by_email(&self, _email: &str) -> Result<Option<Profile>, String> {
        Err("find failed".to_string())
    }
}

#[async_trait]
impl RoomStore for FailingStore {
    async fn insert_if_absent(&self, _room: RoomShare) -> Result<bool, String> {
        Err("insert failed".to_string())
    }

    async fn admit(
        &self,
        _token: &str,
        _user_id: &str,
        _now: u64,
    ) -> Result<Option<(RoomShare, Result<bool, RoomError>)>, String> {
        Err("admit failed".to_string())
    }

    async fn reassign_participant(&self, _from: &str, _to: &str) -> Result<usize, String> {
        Err("reassign failed".to_string())
    }
}

#[async_trait]
impl ActivityLog for FailingStore {
    async fn append(
        &self,
        _map_id: &str,
        _user_id: &str,
        _action: &str,
        _at: u64,
    ) -> Result<ActivityEntry, String> {
        Err("append failed".to_string())
    }

    async fn list_for_map(&self, _map_id: &str) -> Result<Vec<ActivityEntry>, String> {
        Err("list failed".to_string())
    }

    async fn reattribute(&self, _from: &str, _to: &str) -> Result<usize, String> {
        Err("reattribute failed".to_string())
    }
}

pub(crate) fn guest_profile(user_id: &str, display_name: &str) -> Profile {
    Profile {
        user_id: user_id.to_string(),
        display_name: Some(display_name.to_string()),
        email: None,
        avatar_url: None,
        is_anonymous: true,
        converted_user_id: None,
        created_at: NOW,
    }
}

pub(crate) fn registered_profile(user_id: &str, display_name: Option<&str>) -> Profile {
    Profile {
        user_id: user_id.to_string(),
        display_name: display_name.map(str::to_string),
        email: Some(format!("{user_id}@example.com")),
        avatar_url: None,
        is_anonymous: false,
        converted_user_id: None,
        created_at: NOW,
    }
}

pub(crate) fn session(user_id: &str, is_anonymous: bool) -> Session {
    Session {
        user_id: user_id.to_string(),
        is_anonymous,
        expires_at: NOW + 3600,
    }
}

pub(crate) fn open_room(token: &str, max_users: u32) -> RoomShare {
    RoomShare {
        token: token.to_string(),
        map_id: "map-1".to_string(),
        map_title: "Product Roadmap".to_string(),
        permissions: Permission::Edit,
        max_users,
        participants: Vec::new(),
        expires_at: NOW + 86_400,
        is_active: true,
        created_by: "owner".to_string(),
    }
}

// Fresh in-memory backend with the given rooms and profiles seeded.
pub(crate) async fn seeded_state(rooms: Vec<RoomShare>, profiles: Vec<Profile>) -> AppState {
    let state = AppState::in_memory();
    {
        let mut table = state.rooms.lock().await;
        for room in rooms {
            table.insert(room.token.clone(), room);
        }
    }
    {
        let mut table = state.profiles.lock().await;
        for profile in profiles {
            table.insert(profile.user_id.clone(), profile);
        }
    }
    state
}
