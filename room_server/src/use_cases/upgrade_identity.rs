use tracing::info;

use crate::domain::entities::{Profile, Session};
use crate::domain::errors::RoomError;
use crate::domain::ports::{ActivityLog, ProfileStore, RoomStore};
use crate::domain::rules::validate_display_name;

#[derive(Debug)]
pub struct UpgradeOutcome {
    // False when the guest had already been converted to this identity.
    pub converted: bool,
    pub display_name: Option<String>,
    pub reattributed_activity: usize,
    pub reassigned_rooms: usize,
    pub guest: Profile,
    pub registered: Profile,
}

// Merges a guest identity into the registered identity of the calling session.
//
// The guest record is kept and marked converted; its activity and room seats
// move to the registered identity. Repeating the call with the same pair is
// harmless, which lets clients retry a failed merge later.
pub struct UpgradeIdentityUseCase<P, R, A> {
    pub profiles: P,
    pub rooms: R,
    pub activity: A,
}

impl<P, R, A> UpgradeIdentityUseCase<P, R, A>
where
    P: ProfileStore,
    R: RoomStore,
    A: ActivityLog,
{
    pub async fn execute(
        &self,
        session: &Session,
        guest_user_id: &str,
        display_name: Option<String>,
    ) -> Result<UpgradeOutcome, RoomError> {
        if session.is_anonymous {
            return Err(RoomError::RegistrationRequired);
        }
        if guest_user_id == session.user_id {
            return Err(RoomError::NotAGuest);
        }
        let display_name = display_name
            .map(|name| validate_display_name(&name))
            .transpose()?;

        let mut guest = self
            .profiles
            .get(guest_user_id)
            .await
            .map_err(|_| RoomError::StorageFailure)?
            .ok_or(RoomError::GuestNotFound)?;
        if !guest.is_anonymous {
            return Err(RoomError::NotAGuest);
        }
        let converted = match guest.converted_user_id.as_deref() {
            None => true,
            Some(target) if target == session.user_id => false,
            Some(_) => return Err(RoomError::AlreadyConverted),
        };

        let mut registered = self
            .profiles
            .get(&session.user_id)
            .await
            .map_err(|_| RoomError::StorageFailure)?
            .ok_or(RoomError::Unauthenticated)?;
        if registered.display_name.is_none() {
            registered.display_name = display_name.or_else(|| guest.display_name.clone());
            self.profiles
                .upsert(registered.clone())
                .await
                .map_err(|_| RoomError::StorageFailure)?;
        }

        let reattributed_activity = self
            .activity
            .reattribute(guest_user_id, &session.user_id)
            .await
            .map_err(|_| RoomError::StorageFailure)?;
        let reassigned_rooms = self
            .rooms
            .reassign_participant(guest_user_id, &session.user_id)
            .await
            .map_err(|_| RoomError::StorageFailure)?;

        // Marked last so an interrupted merge is never reported as complete.
        guest.converted_user_id = Some(session.user_id.clone());
        self.profiles
            .upsert(guest.clone())
            .await
            .map_err(|_| RoomError::StorageFailure)?;

        info!(
            guest_user_id,
            user_id = %session.user_id,
            reattributed_activity,
            reassigned_rooms,
            "guest identity upgraded"
        );

        Ok(UpgradeOutcome {
            converted,
            display_name: registered.display_name.clone(),
            reattributed_activity,
            reassigned_rooms,
            guest,
            registered,
        })
    }
}
