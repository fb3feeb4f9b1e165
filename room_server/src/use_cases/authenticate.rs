use crate::domain::entities::Session;
use crate::domain::errors::RoomError;
use crate::domain::ports::{Clock, SessionStore};

// Resolves a bearer access token into its live session.
pub struct AuthenticateUseCase<C, S> {
    pub clock: C,
    pub store: S,
}

impl<C, S> AuthenticateUseCase<C, S>
where
    C: Clock,
    S: SessionStore,
{
    pub async fn execute(&self, access_token: &str) -> Result<Session, RoomError> {
        let session = self
            .store
            .get(access_token)
            .await
            .map_err(|_| RoomError::StorageFailure)?
            .ok_or(RoomError::Unauthenticated)?;

        if session.expires_at <= self.clock.now_epoch_seconds() {
            // Best-effort cleanup of expired session.
            let _ = self.store.remove(access_token).await;
            return Err(RoomError::SessionExpired);
        }

        Ok(session)
    }
}
