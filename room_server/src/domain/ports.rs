use async_trait::async_trait;

use crate::domain::entities::{ActivityEntry, Profile, RoomShare, Session};
use crate::domain::errors::RoomError;

// Port for access-token sessions used by auth and room use cases.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, token: String, session: Session) -> Result<(), String>;
    async fn get(&self, token: &str) -> Result<Option<Session>, String>;
    async fn remove(&self, token: &str) -> Result<bool, String>;
}

// Port for guest and registered profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn upsert(&self, profile: Profile) -> Result<(), String>;
    async fn get(&self, user_id: &str) -> Result<Option<Profile>, String>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, String>;
}

// Port for room codes and their participants.
#[async_trait]
pub trait RoomStore: Send + Sync {
    // Returns false when the token is already taken.
    async fn insert_if_absent(&self, room: RoomShare) -> Result<bool, String>;
    // Applies the admission rule atomically; `None` when the token is unknown.
    async fn admit(
        &self,
        token: &str,
        user_id: &str,
        now: u64,
    ) -> Result<Option<(RoomShare, Result<bool, RoomError>)>, String>;
    async fn reassign_participant(&self, from: &str, to: &str) -> Result<usize, String>;
}

// Port for the per-map activity log.
#[async_trait]
pub trait ActivityLog: Send + Sync {
    async fn append(
        &self,
        map_id: &str,
        user_id: &str,
        action: &str,
        at: u64,
    ) -> Result<ActivityEntry, String>;
    async fn list_for_map(&self, map_id: &str) -> Result<Vec<ActivityEntry>, String>;
    async fn reattribute(&self, from: &str, to: &str) -> Result<usize, String>;
}

// Port for retrieving the current time.
pub trait Clock: Send + Sync {
    fn now_epoch_seconds(&self) -> u64;
}
