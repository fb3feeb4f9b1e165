use std::sync::Arc;
use tracing::{error, info};

use crate::domain::errors::{BackendError, JoinError};
use crate::domain::identity::SessionContext;
use crate::domain::join::{JoinResult, TokenExchange};
use crate::domain::ports::RoomGateway;
use crate::domain::room_code::RoomCode;

/// Exchanges a validated room code for document access with the current session.
pub struct TokenExchangeUseCase {
    pub rooms: Arc<dyn RoomGateway>,
}

impl TokenExchangeUseCase {
    #[tracing::instrument(name = "exchange_token", skip_all, fields(code = %code.as_str()))]
    pub async fn execute(
        &self,
        context: &SessionContext,
        code: RoomCode,
        display_name: Option<String>,
    ) -> Result<JoinResult, JoinError> {
        let Some(session) = context.session.as_ref() else {
            return Err(JoinError::Unavailable("no active session".to_string()));
        };

        let result = self
            .rooms
            .exchange_token(session, TokenExchange { code, display_name })
            .await
            .map_err(classify)?;

        info!(
            map_id = %result.map_id,
            is_guest = result.is_guest,
            current_users = result.current_users,
            "room code accepted"
        );
        Ok(result)
    }
}

// Maps backend failures onto the user-facing categories.
pub fn classify(err: BackendError) -> JoinError {
    match err.status() {
        Some(404) | Some(410) => JoinError::RoomNotFound,
        Some(403) => JoinError::RoomFull,
        Some(401) => JoinError::SessionRejected,
        _ => {
            error!(error = %err, "token exchange failed");
            JoinError::Unavailable(err.to_string())
        }
    }
}
