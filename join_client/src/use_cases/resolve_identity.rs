use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::identity::{PriorGuest, SessionContext};
use crate::domain::ports::{Clock, ProfileProvider, SessionStorage};

/// Reads the stored session and looks up its profile.
///
/// Never fails: unreadable storage, an expired session or a failed profile
/// lookup all resolve to a context without identity, so the flow falls back
/// to asking for a display name. An expired guest session still leaves its
/// user id behind so a later sign-in can merge that guest.
pub struct ResolveIdentityUseCase {
    pub storage: Arc<dyn SessionStorage>,
    pub profiles: Arc<dyn ProfileProvider>,
    pub clock: Arc<dyn Clock>,
}

impl ResolveIdentityUseCase {
    #[tracing::instrument(name = "resolve_identity", skip_all)]
    pub async fn execute(&self) -> SessionContext {
        let stored = match self.storage.load().await {
            Ok(stored) => stored,
            Err(err) => {
                warn!(error = %err, "session storage unreadable");
                return SessionContext::default();
            }
        };

        let Some(session) = stored.session else {
            return SessionContext {
                pending_upgrade: stored.pending_upgrade,
                ..SessionContext::default()
            };
        };

        if session.is_expired(self.clock.now_epoch_seconds()) {
            debug!(user_id = %session.user_id, "stored session expired");
            let lapsed_guest = session.is_anonymous.then(|| PriorGuest {
                user_id: session.user_id,
                display_name: session.display_name,
            });
            return SessionContext {
                pending_upgrade: stored.pending_upgrade,
                lapsed_guest,
                ..SessionContext::default()
            };
        }

        let profile = match self.profiles.fetch_profile(&session.user_id).await {
            Ok(profile) => profile,
            Err(err) => {
                warn!(user_id = %session.user_id, error = %err, "profile lookup failed");
                None
            }
        };

        SessionContext {
            session: Some(session),
            profile,
            pending_upgrade: stored.pending_upgrade,
            lapsed_guest: None,
        }
    }
}
