use std::sync::Arc;
use tracing::{error, info};

use crate::domain::best_effort::BestEffort;
use crate::domain::errors::JoinError;
use crate::domain::identity::{Profile, Session, SessionContext};
use crate::domain::ports::{AnonymousAuth, SessionStorage, StoredState};

/// Establishes the session a join attempt runs under.
pub struct SessionBootstrapper {
    pub auth: Arc<dyn AnonymousAuth>,
    pub storage: Arc<dyn SessionStorage>,
}

impl SessionBootstrapper {
    /// Creates an anonymous session with the display name attached at creation
    /// and writes it to storage once.
    #[tracing::instrument(name = "anonymous_bootstrap", skip_all)]
    pub async fn sign_in(
        &self,
        context: &mut SessionContext,
        display_name: &str,
    ) -> Result<(), JoinError> {
        let session = self
            .auth
            .sign_in_anonymously(display_name)
            .await
            .map_err(|err| {
                error!(error = %err, "anonymous sign-in failed");
                JoinError::Authentication(err.to_string())
            })?;

        info!(user_id = %session.user_id, "anonymous session created");

        let stored = StoredState {
            session: Some(session.clone()),
            pending_upgrade: context.pending_upgrade.clone(),
        };
        // A session that could not be persisted still serves this attempt.
        BestEffort::from_result("store_session", self.storage.save(&stored).await).acknowledge();

        context.profile = Some(guest_profile(&session, display_name));
        context.session = Some(session);
        Ok(())
    }

    /// Keeps the existing guest session; the name travels with the exchange.
    pub fn reuse_guest(
        &self,
        context: &mut SessionContext,
        display_name: &str,
    ) -> Result<(), JoinError> {
        let user_id = match (&context.session, &context.profile) {
            (Some(session), Some(profile)) if profile.is_anonymous => session.user_id.clone(),
            _ => {
                return Err(JoinError::Authentication(
                    "no guest session to reuse".to_string(),
                ));
            }
        };

        if let Some(profile) = context.profile.as_mut() {
            profile.display_name = Some(display_name.to_string());
        }
        info!(%user_id, "reusing guest session");
        Ok(())
    }
}

fn guest_profile(session: &Session, display_name: &str) -> Profile {
    Profile {
        user_id: session.user_id.clone(),
        display_name: Some(display_name.to_string()),
        email: None,
        avatar_url: None,
        is_anonymous: true,
        converted_user_id: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::identity::{Identity, PendingUpgrade};
    use crate::use_cases::test_support::{
        FakeBackend, RecordingStorage, guest_context, registered_profile, registered_session,
        upstream,
    };

    fn bootstrapper(
        backend: Arc<FakeBackend>,
        storage: Arc<RecordingStorage>,
    ) -> SessionBootstrapper {
        SessionBootstrapper {
            auth: backend,
            storage,
        }
    }

    #[tokio::test]
    async fn when_signing_in_then_name_is_metadata_and_session_is_stored_once() {
        let backend = Arc::new(FakeBackend::default());
        let storage = Arc::new(RecordingStorage::default());
        let mut context = SessionContext::default();

        bootstrapper(backend.clone(), storage.clone())
            .sign_in(&mut context, "Alex")
            .await
            .expect("expected sign-in");

        assert_eq!(backend.calls(), vec!["sign_in:Alex".to_string()]);
        assert_eq!(storage.saves().len(), 1);
        assert_eq!(storage.current().session, context.session);
        assert!(matches!(
            context.identity(),
            Identity::Guest { display_name: Some(ref name), .. } if name == "Alex"
        ));
    }

    #[tokio::test]
    async fn when_signing_in_then_pending_upgrade_is_preserved_in_storage() {
        let backend = Arc::new(FakeBackend::default());
        let storage = Arc::new(RecordingStorage::default());
        let pending = PendingUpgrade {
            guest_user_id: "guest-0".to_string(),
            display_name: Some("Sam".to_string()),
        };
        let mut context = SessionContext {
            pending_upgrade: Some(pending.clone()),
            ..SessionContext::default()
        };

        bootstrapper(backend, storage.clone())
            .sign_in(&mut context, "Alex")
            .await
            .expect("expected sign-in");

        assert_eq!(storage.current().pending_upgrade, Some(pending));
    }

    #[tokio::test]
    async fn when_sign_in_fails_then_authentication_error_and_context_is_untouched() {
        let backend = Arc::new(FakeBackend::default());
        backend.fail_sign_in(upstream(500));
        let storage = Arc::new(RecordingStorage::default());
        let mut context = SessionContext::default();

        let err = bootstrapper(backend, storage.clone())
            .sign_in(&mut context, "Alex")
            .await
            .expect_err("expected failure");

        assert_eq!(err.user_message(), "Failed to authenticate anonymously");
        assert!(err.is_retryable());
        assert_eq!(context, SessionContext::default());
        assert!(storage.saves().is_empty());
    }

    #[tokio::test]
    async fn when_storage_write_fails_then_sign_in_still_succeeds() {
        let backend = Arc::new(FakeBackend::default());
        let storage = Arc::new(RecordingStorage::default());
        storage.fail_saves();
        let mut context = SessionContext::default();

        bootstrapper(backend, storage)
            .sign_in(&mut context, "Alex")
            .await
            .expect("expected sign-in");

        assert!(context.session.is_some());
    }

    #[test]
    fn when_reusing_guest_then_no_call_is_made_and_new_name_is_kept() {
        let backend = Arc::new(FakeBackend::default());
        let storage = Arc::new(RecordingStorage::default());
        let mut context = guest_context("guest-1", "User 4821");

        bootstrapper(backend.clone(), storage.clone())
            .reuse_guest(&mut context, "Alex")
            .expect("expected reuse");

        assert!(backend.calls().is_empty());
        assert!(storage.saves().is_empty());
        assert_eq!(context.guest_display_name(), Some("Alex"));
    }

    #[test]
    fn when_reusing_without_guest_session_then_it_fails() {
        let backend = Arc::new(FakeBackend::default());
        let storage = Arc::new(RecordingStorage::default());
        let mut context = SessionContext {
            session: Some(registered_session("user-1")),
            profile: Some(registered_profile("user-1", None)),
            ..SessionContext::default()
        };

        let err = bootstrapper(backend, storage)
            .reuse_guest(&mut context, "Alex")
            .expect_err("expected failure");

        assert!(matches!(err, JoinError::Authentication(_)));
    }
}
