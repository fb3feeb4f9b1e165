use tracing::warn;

use crate::domain::entities::{Permission, Session};
use crate::domain::errors::RoomError;
use crate::domain::ports::{ActivityLog, Clock, ProfileStore, RoomStore};
use crate::domain::rules::{canonical_room_code, validate_display_name};

pub const JOINED_ACTION: &str = "joined";

// Outcome of a successful room-code exchange.
#[derive(Debug, PartialEq)]
pub struct JoinOutcome {
    pub map_id: String,
    pub map_title: String,
    pub permissions: Permission,
    pub is_guest: bool,
    pub current_users: u32,
    pub max_users: u32,
}

// Exchanges a room code for map access on behalf of an authenticated session.
pub struct JoinRoomUseCase<C, R, P, A> {
    pub clock: C,
    pub rooms: R,
    pub profiles: P,
    pub activity: A,
}

impl<C, R, P, A> JoinRoomUseCase<C, R, P, A>
where
    C: Clock,
    R: RoomStore,
    P: ProfileStore,
    A: ActivityLog,
{
    pub async fn execute(
        &self,
        session: &Session,
        token: &str,
        display_name: Option<String>,
    ) -> Result<JoinOutcome, RoomError> {
        let token = canonical_room_code(token)?;
        let display_name = display_name
            .map(|name| validate_display_name(&name))
            .transpose()?;

        let now = self.clock.now_epoch_seconds();
        let (room, admission) = self
            .rooms
            .admit(&token, &session.user_id, now)
            .await
            .map_err(|_| RoomError::StorageFailure)?
            .ok_or(RoomError::RoomNotFound)?;
        let newly_joined = admission?;

        // Registered identities keep their profile name; guests may rename on join.
        if session.is_anonymous {
            if let Some(name) = display_name {
                self.rename_guest(&session.user_id, name).await;
            }
        }

        if newly_joined {
            if let Err(err) = self
                .activity
                .append(&room.map_id, &session.user_id, JOINED_ACTION, now)
                .await
            {
                warn!(error = %err, map_id = %room.map_id, "failed to record join activity");
            }
        }

        Ok(JoinOutcome {
            current_users: room.current_users(),
            max_users: room.max_users,
            map_id: room.map_id,
            map_title: room.map_title,
            permissions: room.permissions,
            is_guest: session.is_anonymous,
        })
    }

    async fn rename_guest(&self, user_id: &str, name: String) {
        let profile = match self.profiles.get(user_id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => return,
            Err(err) => {
                warn!(error = %err, "failed to load guest profile for rename");
                return;
            }
        };
        if profile.display_name.as_deref() == Some(name.as_str()) {
            return;
        }

        let mut profile = profile;
        profile.display_name = Some(name);
        if let Err(err) = self.profiles.upsert(profile).await {
            warn!(error = %err, "failed to update guest display name");
        }
    }
}
