use crate::domain::entities::{Permission, RoomShare, Session};
use crate::domain::errors::RoomError;
use crate::domain::ports::{Clock, RoomStore};
use crate::domain::rules::generate_room_code;

// Collisions are rare in a 32^6 space; give up quickly instead of spinning.
const MAX_CODE_ATTEMPTS: usize = 8;
pub const MAX_ROOM_USERS: u32 = 50;

#[derive(Debug)]
pub struct IssueRoomRequest {
    pub map_id: String,
    pub map_title: String,
    pub permissions: Permission,
    pub max_users: u32,
    pub ttl_seconds: u64,
}

#[derive(Debug)]
pub struct IssuedRoom {
    pub token: String,
    pub expires_at: u64,
}

// Issues a fresh room code for a map owned by a registered identity.
pub struct IssueRoomUseCase<C, R> {
    pub clock: C,
    pub rooms: R,
}

impl<C, R> IssueRoomUseCase<C, R>
where
    C: Clock,
    R: RoomStore,
{
    pub async fn execute(
        &self,
        session: &Session,
        request: IssueRoomRequest,
    ) -> Result<IssuedRoom, RoomError> {
        if session.is_anonymous {
            return Err(RoomError::RegistrationRequired);
        }
        let map_id = request.map_id.trim().to_string();
        let map_title = request.map_title.trim().to_string();
        if map_id.is_empty()
            || map_title.is_empty()
            || !(1..=MAX_ROOM_USERS).contains(&request.max_users)
            || request.ttl_seconds == 0
        {
            return Err(RoomError::InvalidRoomSettings);
        }

        let expires_at = self.clock.now_epoch_seconds() + request.ttl_seconds;
        for _ in 0..MAX_CODE_ATTEMPTS {
            let token = generate_room_code(&mut rand::rng());
            let room = RoomShare {
                token: token.clone(),
                map_id: map_id.clone(),
                map_title: map_title.clone(),
                permissions: request.permissions,
                max_users: request.max_users,
                participants: Vec::new(),
                expires_at,
                is_active: true,
                created_by: session.user_id.clone(),
            };

            let inserted = self
                .rooms
                .insert_if_absent(room)
                .await
                .map_err(|_| RoomError::StorageFailure)?;
            if inserted {
                return Ok(IssuedRoom { token, expires_at });
            }
        }

        Err(RoomError::CodeSpaceExhausted)
    }
}
