use uuid::Uuid;

use crate::domain::entities::{Profile, Session};
use crate::domain::errors::RoomError;
use crate::domain::ports::{Clock, ProfileStore, SessionStore};
use crate::domain::rules::{default_guest_name, validate_display_name, validate_email};

// Session issued by either sign-in flavour.
#[derive(Debug)]
pub struct IssuedSession {
    pub user_id: String,
    pub access_token: String,
    pub expires_at: u64,
    pub is_anonymous: bool,
    pub display_name: Option<String>,
    pub profile: Profile,
}

// Anonymous sign-in: the display name is attached at creation time.
pub struct AnonymousSignInUseCase<C, S, P> {
    pub clock: C,
    pub sessions: S,
    pub profiles: P,
    pub ttl_seconds: u64,
}

impl<C, S, P> AnonymousSignInUseCase<C, S, P>
where
    C: Clock,
    S: SessionStore,
    P: ProfileStore,
{
    pub async fn execute(&self, display_name: Option<String>) -> Result<IssuedSession, RoomError> {
        let display_name = match display_name {
            Some(name) => validate_display_name(&name)?,
            None => default_guest_name(&mut rand::rng()),
        };

        let now = self.clock.now_epoch_seconds();
        let profile = Profile {
            user_id: Uuid::new_v4().to_string(),
            display_name: Some(display_name),
            email: None,
            avatar_url: None,
            is_anonymous: true,
            converted_user_id: None,
            created_at: now,
        };

        issue(&self.sessions, &self.profiles, profile, now + self.ttl_seconds).await
    }
}

// Registration of a durable identity; credentials belong to the hosted provider.
pub struct RegisterUseCase<C, S, P> {
    pub clock: C,
    pub sessions: S,
    pub profiles: P,
    pub ttl_seconds: u64,
}

impl<C, S, P> RegisterUseCase<C, S, P>
where
    C: Clock,
    S: SessionStore,
    P: ProfileStore,
{
    pub async fn execute(
        &self,
        email: &str,
        display_name: Option<String>,
    ) -> Result<IssuedSession, RoomError> {
        let email = validate_email(email)?;
        let display_name = display_name
            .map(|name| validate_display_name(&name))
            .transpose()?;

        let existing = self
            .profiles
            .find_by_email(&email)
            .await
            .map_err(|_| RoomError::StorageFailure)?;
        if existing.is_some() {
            return Err(RoomError::EmailTaken);
        }

        let now = self.clock.now_epoch_seconds();
        let profile = Profile {
            user_id: Uuid::new_v4().to_string(),
            display_name,
            email: Some(email),
            avatar_url: None,
            is_anonymous: false,
            converted_user_id: None,
            created_at: now,
        };

        issue(&self.sessions, &self.profiles, profile, now + self.ttl_seconds).await
    }
}

// Passwordless sign-in to an existing registered account.
pub struct SignInUseCase<C, S, P> {
    pub clock: C,
    pub sessions: S,
    pub profiles: P,
    pub ttl_seconds: u64,
}

impl<C, S, P> SignInUseCase<C, S, P>
where
    C: Clock,
    S: SessionStore,
    P: ProfileStore,
{
    pub async fn execute(&self, email: &str) -> Result<IssuedSession, RoomError> {
        let email = validate_email(email)?;

        let profile = self
            .profiles
            .find_by_email(&email)
            .await
            .map_err(|_| RoomError::StorageFailure)?
            .filter(|profile| !profile.is_anonymous)
            .ok_or(RoomError::AccountNotFound)?;

        let expires_at = self.clock.now_epoch_seconds() + self.ttl_seconds;
        open_session(&self.sessions, profile, expires_at).await
    }
}

async fn issue<S, P>(
    sessions: &S,
    profiles: &P,
    profile: Profile,
    expires_at: u64,
) -> Result<IssuedSession, RoomError>
where
    S: SessionStore,
    P: ProfileStore,
{
    profiles
        .upsert(profile.clone())
        .await
        .map_err(|_| RoomError::StorageFailure)?;

    open_session(sessions, profile, expires_at).await
}

async fn open_session<S>(
    sessions: &S,
    profile: Profile,
    expires_at: u64,
) -> Result<IssuedSession, RoomError>
where
    S: SessionStore,
{
    let access_token = Uuid::new_v4().to_string();
    let session = Session {
        user_id: profile.user_id.clone(),
        is_anonymous: profile.is_anonymous,
        expires_at,
    };

    sessions
        .insert(access_token.clone(), session)
        .await
        .map_err(|_| RoomError::StorageFailure)?;

    Ok(IssuedSession {
        user_id: profile.user_id.clone(),
        access_token,
        expires_at,
        is_anonymous: profile.is_anonymous,
        display_name: profile.display_name.clone(),
        profile,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface_adapters::state::AppState;
    use crate::use_cases::test_support::{FailingStore, FixedClock, NOW};

    #[tokio::test]
    async fn when_display_name_is_given_then_guest_session_carries_it() {
        let state = AppState::in_memory();
        let use_case = AnonymousSignInUseCase {
            clock: FixedClock(NOW),
            sessions: state.session_store(),
            profiles: state.profile_store(),
            ttl_seconds: 3600,
        };

        let issued = use_case
            .execute(Some(" Alex ".to_string()))
            .await
            .expect("expected anonymous sign-in to succeed");

        assert!(issued.is_anonymous);
        assert_eq!(issued.display_name.as_deref(), Some("Alex"));
        assert_eq!(issued.expires_at, NOW + 3600);

        let sessions = state.sessions.lock().await;
        let stored = sessions
            .get(&issued.access_token)
            .expect("expected session to be stored");
        assert_eq!(stored.user_id, issued.user_id);
        assert!(stored.is_anonymous);

        let profiles = state.profiles.lock().await;
        let profile = profiles
            .get(&issued.user_id)
            .expect("expected profile to be stored");
        assert!(profile.is_anonymous);
        assert_eq!(profile.display_name.as_deref(), Some("Alex"));
    }

    #[tokio::test]
    async fn when_display_name_is_absent_then_a_placeholder_name_is_assigned() {
        let state = AppState::in_memory();
        let use_case = AnonymousSignInUseCase {
            clock: FixedClock(NOW),
            sessions: state.session_store(),
            profiles: state.profile_store(),
            ttl_seconds: 3600,
        };

        let issued = use_case
            .execute(None)
            .await
            .expect("expected anonymous sign-in to succeed");

        let name = issued.display_name.expect("expected placeholder name");
        assert!(name.starts_with("User "));
    }

    #[tokio::test]
    async fn when_display_name_is_blank_then_returns_invalid_display_name() {
        let state = AppState::in_memory();
        let use_case = AnonymousSignInUseCase {
            clock: FixedClock(NOW),
            sessions: state.session_store(),
            profiles: state.profile_store(),
            ttl_seconds: 3600,
        };

        let result = use_case.execute(Some("   ".to_string())).await;

        assert!(matches!(result, Err(RoomError::InvalidDisplayName)));
        assert!(state.sessions.lock().await.is_empty());
    }

    #[tokio::test]
    async fn when_session_store_fails_then_returns_storage_failure() {
        let state = AppState::in_memory();
        let use_case = AnonymousSignInUseCase {
            clock: FixedClock(NOW),
            sessions: FailingStore,
            profiles: state.profile_store(),
            ttl_seconds: 3600,
        };

        let result = use_case.execute(Some("Alex".to_string())).await;

        assert!(matches!(result, Err(RoomError::StorageFailure)));
    }

    #[tokio::test]
    async fn when_email_is_new_then_registered_session_is_issued() {
        let state = AppState::in_memory();
        let use_case = RegisterUseCase {
            clock: FixedClock(NOW),
            sessions: state.session_store(),
            profiles: state.profile_store(),
            ttl_seconds: 3600,
        };

        let issued = use_case
            .execute("Alex@Example.com", None)
            .await
            .expect("expected registration to succeed");

        assert!(!issued.is_anonymous);
        assert_eq!(issued.display_name, None);
        assert_eq!(issued.profile.email.as_deref(), Some("alex@example.com"));
    }

    #[tokio::test]
    async fn when_email_is_already_registered_then_returns_email_taken() {
        let state = AppState::in_memory();
        let use_case = RegisterUseCase {
            clock: FixedClock(NOW),
            sessions: state.session_store(),
            profiles: state.profile_store(),
            ttl_seconds: 3600,
        };

        use_case
            .execute("alex@example.com", None)
            .await
            .expect("expected first registration to succeed");
        let result = use_case.execute("ALEX@example.com", None).await;

        assert!(matches!(result, Err(RoomError::EmailTaken)));
    }

    #[tokio::test]
    async fn when_account_exists_then_sign_in_opens_a_new_session_for_it() {
        let state = AppState::in_memory();
        let registered = RegisterUseCase {
            clock: FixedClock(NOW),
            sessions: state.session_store(),
            profiles: state.profile_store(),
            ttl_seconds: 3600,
        }
        .execute("jordan@example.com", Some("Jordan".to_string()))
        .await
        .expect("expected registration to succeed");
        let use_case = SignInUseCase {
            clock: FixedClock(NOW + 10),
            sessions: state.session_store(),
            profiles: state.profile_store(),
            ttl_seconds: 3600,
        };

        let issued = use_case
            .execute(" Jordan@Example.com ")
            .await
            .expect("expected sign-in to succeed");

        assert_eq!(issued.user_id, registered.user_id);
        assert_ne!(issued.access_token, registered.access_token);
        assert!(!issued.is_anonymous);
        assert_eq!(issued.display_name.as_deref(), Some("Jordan"));
        assert_eq!(issued.expires_at, NOW + 10 + 3600);
        assert_eq!(state.sessions.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn when_email_is_unknown_then_sign_in_returns_account_not_found() {
        let state = AppState::in_memory();
        let use_case = SignInUseCase {
            clock: FixedClock(NOW),
            sessions: state.session_store(),
            profiles: state.profile_store(),
            ttl_seconds: 3600,
        };

        let result = use_case.execute("nobody@example.com").await;

        assert!(matches!(result, Err(RoomError::AccountNotFound)));
        assert!(state.sessions.lock().await.is_empty());
    }
}
