use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::best_effort::BestEffort;
use crate::domain::errors::BackendError;
use crate::domain::identity::{PendingUpgrade, Session, SessionContext};
use crate::domain::join::IdentityUpgrade;
use crate::domain::ports::{
    AccountAuth, Clock, IdentityMerge, ProfileProvider, SessionStorage, StoredState,
};

const MERGE: &str = "identity_merge";

/// What a completed sign-in left behind.
#[derive(Debug)]
pub struct UpgradeReport {
    pub context: SessionContext,
    // Guest name proposed because the registered profile had none.
    pub carried_display_name: Option<String>,
    // `None` when no guest session was attached.
    pub merge: Option<BestEffort>,
}

/// Turns a guest into a registered identity without losing its name or
/// activity. The new session is kept even when the merge fails.
pub struct IdentityUpgradeUseCase {
    pub accounts: Arc<dyn AccountAuth>,
    pub profiles: Arc<dyn ProfileProvider>,
    pub merge: Arc<dyn IdentityMerge>,
    pub storage: Arc<dyn SessionStorage>,
    pub clock: Arc<dyn Clock>,
}

impl IdentityUpgradeUseCase {
    // Sign-up entry point; the backend chooses no name so the guest's can carry over.
    #[tracing::instrument(name = "sign_up", skip_all)]
    pub async fn sign_up(
        &self,
        previous: &SessionContext,
        email: &str,
    ) -> Result<UpgradeReport, BackendError> {
        let session = self.accounts.register(email, None).await?;
        info!(user_id = %session.user_id, "registered session created");
        Ok(self.complete_sign_in(previous, session).await)
    }

    // Sign-in to an existing account; its own display name, if any, is kept.
    #[tracing::instrument(name = "sign_in", skip_all)]
    pub async fn sign_in(
        &self,
        previous: &SessionContext,
        email: &str,
    ) -> Result<UpgradeReport, BackendError> {
        let session = self.accounts.sign_in(email).await?;
        info!(user_id = %session.user_id, "registered session opened");
        Ok(self.complete_sign_in(previous, session).await)
    }

    #[tracing::instrument(name = "complete_sign_in", skip_all, fields(user_id = %session.user_id))]
    pub async fn complete_sign_in(
        &self,
        previous: &SessionContext,
        session: Session,
    ) -> UpgradeReport {
        let guest = previous.prior_guest().filter(|guest| guest.user_id != session.user_id);

        let mut profile = match self.profiles.fetch_profile(&session.user_id).await {
            Ok(profile) => profile,
            Err(err) => {
                warn!(error = %err, "registered profile lookup failed");
                None
            }
        };

        let has_name = profile
            .as_ref()
            .and_then(|p| p.display_name.as_deref())
            .is_some();
        let carried_display_name = match &guest {
            Some(guest) if !has_name => guest.display_name.clone(),
            _ => None,
        };

        let pending = guest.map(|guest| PendingUpgrade {
            guest_user_id: guest.user_id,
            display_name: carried_display_name.clone(),
        });

        // Written before the merge so a crash mid-call still leaves a replayable marker.
        self.store(&session, pending.clone()).await.acknowledge();

        let Some(pending) = pending else {
            return UpgradeReport {
                context: SessionContext {
                    session: Some(session),
                    profile,
                    pending_upgrade: None,
                    lapsed_guest: None,
                },
                carried_display_name,
                merge: None,
            };
        };

        let merge = self.merge_guest(&session, &pending).await;
        let pending_upgrade = if merge.is_success() {
            self.store(&session, None).await.acknowledge();
            if let (Some(profile), Some(name)) = (profile.as_mut(), carried_display_name.as_ref())
            {
                profile.display_name = Some(name.clone());
            }
            None
        } else {
            Some(pending)
        };

        UpgradeReport {
            context: SessionContext {
                session: Some(session),
                profile,
                pending_upgrade,
                lapsed_guest: None,
            },
            carried_display_name,
            merge: Some(merge),
        }
    }

    /// Replays a merge that failed earlier; clears the marker on success.
    #[tracing::instrument(name = "retry_pending_upgrade", skip_all)]
    pub async fn retry_pending(&self) -> BestEffort {
        let stored = match self.storage.load().await {
            Ok(stored) => stored,
            Err(err) => return BestEffort::failed(MERGE, err),
        };
        let Some(pending) = stored.pending_upgrade else {
            return BestEffort::succeeded(MERGE);
        };
        let session = match stored.session {
            Some(session)
                if !session.is_anonymous
                    && !session.is_expired(self.clock.now_epoch_seconds()) =>
            {
                session
            }
            _ => return BestEffort::failed(MERGE, "no registered session to merge into"),
        };

        let merge = self.merge_guest(&session, &pending).await;
        if merge.is_success() {
            self.store(&session, None).await.acknowledge();
        }
        merge
    }

    async fn merge_guest(&self, session: &Session, pending: &PendingUpgrade) -> BestEffort {
        let request = IdentityUpgrade {
            guest_user_id: pending.guest_user_id.clone(),
            display_name: pending.display_name.clone(),
        };

        match self.merge.upgrade_identity(session, request).await {
            Ok(receipt) => {
                info!(
                    guest_user_id = %pending.guest_user_id,
                    converted = receipt.converted,
                    reattributed_activity = receipt.reattributed_activity,
                    "guest identity merged"
                );
                BestEffort::succeeded(MERGE)
            }
            Err(err) => {
                warn!(guest_user_id = %pending.guest_user_id, error = %err, "merge deferred");
                BestEffort::failed(MERGE, err)
            }
        }
    }

    async fn store(&self, session: &Session, pending_upgrade: Option<PendingUpgrade>) -> BestEffort {
        let state = StoredState {
            session: Some(session.clone()),
            pending_upgrade,
        };
        BestEffort::from_result("store_session", self.storage.save(&state).await)
    }
}
