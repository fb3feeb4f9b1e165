use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

use crate::domain::entities::{ActivityEntry, Profile, RoomShare, Session};
use crate::domain::errors::RoomError;
use crate::domain::ports::{ActivityLog, Clock, ProfileStore, RoomStore, SessionStore};
use crate::domain::rules;

pub type SessionTable = Arc<Mutex<HashMap<String, Session>>>;
pub type ProfileTable = Arc<Mutex<HashMap<String, Profile>>>;
pub type RoomTable = Arc<Mutex<HashMap<String, RoomShare>>>;
pub type ActivityTable = Arc<Mutex<Vec<ActivityEntry>>>;

// Application state holding the backend's stores.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionTable,
    pub profiles: ProfileTable,
    pub rooms: RoomTable,
    pub activity: ActivityTable,
    // Optional database mirror for profiles; in-memory stores stay authoritative.
    pub db: Option<PgPool>,
}

impl AppState {
    pub fn in_memory() -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            profiles: Arc::new(Mutex::new(HashMap::new())),
            rooms: Arc::new(Mutex::new(HashMap::new())),
            activity: Arc::new(Mutex::new(Vec::new())),
            db: None,
        }
    }

    pub fn session_store(&self) -> InMemorySessionStore {
        InMemorySessionStore {
            sessions: self.sessions.clone(),
        }
    }

    pub fn profile_store(&self) -> InMemoryProfileStore {
        InMemoryProfileStore {
            profiles: self.profiles.clone(),
        }
    }

    pub fn room_store(&self) -> InMemoryRoomStore {
        InMemoryRoomStore {
            rooms: self.rooms.clone(),
        }
    }

    pub fn activity_log(&self) -> InMemoryActivityLog {
        InMemoryActivityLog {
            entries: self.activity.clone(),
        }
    }

    pub fn profile_mirror(&self) -> Option<PostgresProfileMirror> {
        self.db.clone().map(|db| PostgresProfileMirror { db })
    }
}

// In-memory session store adapter.
#[derive(Clone)]
pub struct InMemorySessionStore {
    pub sessions: SessionTable,
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert(&self, token: String, session: Session) -> Result<(), String> {
        let mut sessions = self.sessions.lock().await;
        sessions.insert(token, session);
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<Session>, String> {
        let sessions = self.sessions.lock().await;
        Ok(sessions.get(token).cloned())
    }

    async fn remove(&self, token: &str) -> Result<bool, String> {
        let mut sessions = self.sessions.lock().await;
        Ok(sessions.remove(token).is_some())
    }
}

// In-memory profile store adapter.
#[derive(Clone)]
pub struct InMemoryProfileStore {
    pub profiles: ProfileTable,
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn upsert(&self, profile: Profile) -> Result<(), String> {
        let mut profiles = self.profiles.lock().await;
        profiles.insert(profile.user_id.clone(), profile);
        Ok(())
    }

    async fn get(&self, user_id: &str) -> Result<Option<Profile>, String> {
        let profiles = self.profiles.lock().await;
        Ok(profiles.get(user_id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, String> {
        let profiles = self.profiles.lock().await;
        Ok(profiles
            .values()
            .find(|profile| profile.email.as_deref() == Some(email))
            .cloned())
    }
}

// In-memory room store adapter; the table lock makes admission atomic.
#[derive(Clone)]
pub struct InMemoryRoomStore {
    pub rooms: RoomTable,
}

#[async_trait]
impl RoomStore for InMemoryRoomStore {
    async fn insert_if_absent(&self, room: RoomShare) -> Result<bool, String> {
        let mut rooms = self.rooms.lock().await;
        if rooms.contains_key(&room.token) {
            return Ok(false);
        }
        rooms.insert(room.token.clone(), room);
        Ok(true)
    }

    async fn admit(
        &self,
        token: &str,
        user_id: &str,
        now: u64,
    ) -> Result<Option<(RoomShare, Result<bool, RoomError>)>, String> {
        let mut rooms = self.rooms.lock().await;
        Ok(rooms.get_mut(token).map(|room| {
            let outcome = rules::admit(room, user_id, now);
            (room.clone(), outcome)
        }))
    }

    async fn reassign_participant(&self, from: &str, to: &str) -> Result<usize, String> {
        let mut rooms = self.rooms.lock().await;
        let mut moved = 0;
        for room in rooms.values_mut() {
            let Some(index) = room.participants.iter().position(|id| id == from) else {
                continue;
            };
            if room.participants.iter().any(|id| id == to) {
                // Both identities held a seat; the upgraded one keeps it.
                room.participants.remove(index);
            } else {
                room.participants[index] = to.to_string();
            }
            moved += 1;
        }
        Ok(moved)
    }
}

// In-memory activity log adapter.
#[derive(Clone)]
pub struct InMemoryActivityLog {
    pub entries: ActivityTable,
}

#[async_trait]
impl ActivityLog for InMemoryActivityLog {
    async fn append(
        &self,
        map_id: &str,
        user_id: &str,
        action: &str,
        at: u64,
    ) -> Result<ActivityEntry, String> {
        let mut entries = self.entries.lock().await;
        let entry = ActivityEntry {
            id: entries.len() as u64 + 1,
            map_id: map_id.to_string(),
            user_id: user_id.to_string(),
            action: action.to_string(),
            created_at: at,
        };
        entries.push(entry.clone());
        Ok(entry)
    }

    async fn list_for_map(&self, map_id: &str) -> Result<Vec<ActivityEntry>, String> {
        let entries = self.entries.lock().await;
        Ok(entries
            .iter()
            .filter(|entry| entry.map_id == map_id)
            .cloned()
            .collect())
    }

    async fn reattribute(&self, from: &str, to: &str) -> Result<usize, String> {
        let mut entries = self.entries.lock().await;
        let mut moved = 0;
        for entry in entries.iter_mut().filter(|entry| entry.user_id == from) {
            entry.user_id = to.to_string();
            moved += 1;
        }
        Ok(moved)
    }
}

// PostgreSQL mirror of profiles for downstream consumers.
#[derive(Clone)]
pub struct PostgresProfileMirror {
    pub db: PgPool,
}

impl PostgresProfileMirror {
    // Upsert the latest profile state, including guest conversion markers.
    pub async fn upsert_profile(&self, profile: &Profile) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, display_name, email, avatar_url, is_anonymous, converted_user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id) DO UPDATE SET
                display_name = EXCLUDED.display_name,
                email = EXCLUDED.email,
                avatar_url = EXCLUDED.avatar_url,
                is_anonymous = EXCLUDED.is_anonymous,
                converted_user_id = EXCLUDED.converted_user_id,
                updated_at = now()
            "#,
        )
        .bind(&profile.user_id)
        .bind(&profile.display_name)
        .bind(&profile.email)
        .bind(&profile.avatar_url)
        .bind(profile.is_anonymous)
        .bind(&profile.converted_user_id)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}

// System clock adapter.
#[derive(Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_seconds(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}
