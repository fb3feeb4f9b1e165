use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::domain::errors::{BackendError, StorageError};
use crate::domain::identity::{PendingUpgrade, Profile, Session, SessionContext};
use crate::domain::join::{
    IdentityUpgrade, JoinResult, Permission, TokenExchange, UpgradeReceipt,
};
use crate::domain::ports::{
    AccountAuth, AnonymousAuth, Clock, IdentityMerge, JoinPorts, Navigator, ProfileProvider,
    RoomGateway, SessionStorage, StoredState,
};

pub(crate) const NOW: u64 = 1_700_000_000;
pub(crate) const SESSION_TTL: u64 = 3600;

// Shared fixed time source for deterministic use-case tests.
pub(crate) struct FixedClock(pub(crate) u64);

impl Clock for FixedClock {
    fn now_epoch_seconds(&self) -> u64 {
        self.0
    }
}

pub(crate) fn guest_session(user_id: &str, display_name: &str) -> Session {
    Session {
        user_id: user_id.to_string(),
        access_token: format!("token-{user_id}"),
        is_anonymous: true,
        display_name: Some(display_name.to_string()),
        expires_at: NOW + SESSION_TTL,
    }
}

pub(crate) fn registered_session(user_id: &str) -> Session {
    Session {
        user_id: user_id.to_string(),
        access_token: format!("token-{user_id}"),
        is_anonymous: false,
        display_name: None,
        expires_at: NOW + SESSION_TTL,
    }
}

pub(crate) fn guest_profile(user_id: &str, display_name: &str) -> Profile {
    Profile {
        user_id: user_id.to_string(),
        display_name: Some(display_name.to_string()),
        email: None,
        avatar_url: None,
        is_anonymous: true,
        converted_user_id: None,
    }
}

pub(crate) fn registered_profile(user_id: &str, display_name: Option<&str>) -> Profile {
    Profile {
        user_id: user_id.to_string(),
        display_name: display_name.map(str::to_string),
        email: Some(format!("{user_id}@example.com")),
        avatar_url: None,
        is_anonymous: false,
        converted_user_id: None,
    }
}

pub(crate) fn guest_context(user_id: &str, display_name: &str) -> SessionContext {
    SessionContext {
        session: Some(guest_session(user_id, display_name)),
        profile: Some(guest_profile(user_id, display_name)),
        ..SessionContext::default()
    }
}

pub(crate) fn join_result(is_guest: bool) -> JoinResult {
    JoinResult {
        map_id: "map-1".to_string(),
        map_title: "Product Roadmap".to_string(),
        permissions: Permission::Edit,
        is_guest,
        current_users: 2,
        max_users: 10,
    }
}

pub(crate) fn upstream(status: u16) -> BackendError {
    BackendError::Upstream {
        status,
        message: None,
    }
}

/// Recording double for every backend port.
#[derive(Default)]
pub(crate) struct FakeBackend {
    profiles: Mutex<HashMap<String, Profile>>,
    calls: Mutex<Vec<String>>,
    exchanges: Mutex<Vec<(String, TokenExchange)>>,
    merges: Mutex<Vec<(String, IdentityUpgrade)>>,
    sign_in_failure: Mutex<Option<BackendError>>,
    profile_failure: Mutex<Option<BackendError>>,
    exchange_failure: Mutex<Option<BackendError>>,
    merge_failure: Mutex<Option<BackendError>>,
    exchange_gate: Mutex<Option<Arc<Notify>>>,
    issued: Mutex<u32>,
}

impl FakeBackend {
    pub(crate) fn with_profile(self, profile: Profile) -> Self {
        self.put_profile(profile);
        self
    }

    pub(crate) fn put_profile(&self, profile: Profile) {
        self.profiles
            .lock()
            .expect("profiles lock")
            .insert(profile.user_id.clone(), profile);
    }

    pub(crate) fn profile(&self, user_id: &str) -> Option<Profile> {
        self.profiles.lock().expect("profiles lock").get(user_id).cloned()
    }

    pub(crate) fn fail_sign_in(&self, err: BackendError) {
        *self.sign_in_failure.lock().expect("failure lock") = Some(err);
    }

    pub(crate) fn fail_profiles(&self, err: BackendError) {
        *self.profile_failure.lock().expect("failure lock") = Some(err);
    }

    pub(crate) fn fail_exchange(&self, err: Option<BackendError>) {
        *self.exchange_failure.lock().expect("failure lock") = err;
    }

    pub(crate) fn fail_merge(&self, err: Option<BackendError>) {
        *self.merge_failure.lock().expect("failure lock") = err;
    }

    // Holds every token exchange until the returned handle is notified.
    pub(crate) fn gate_exchanges(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.exchange_gate.lock().expect("gate lock") = Some(gate.clone());
        gate
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub(crate) fn count(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    pub(crate) fn exchanges(&self) -> Vec<(String, TokenExchange)> {
        self.exchanges.lock().expect("exchanges lock").clone()
    }

    pub(crate) fn merges(&self) -> Vec<(String, IdentityUpgrade)> {
        self.merges.lock().expect("merges lock").clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("calls lock").push(call);
    }

    fn failure(slot: &Mutex<Option<BackendError>>) -> Result<(), BackendError> {
        match slot.lock().expect("failure lock").clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn next_id(&self, prefix: &str) -> String {
        let mut issued = self.issued.lock().expect("issued lock");
        *issued += 1;
        format!("{prefix}-{issued}")
    }
}

#[async_trait]
impl AnonymousAuth for FakeBackend {
    async fn sign_in_anonymously(&self, display_name: &str) -> Result<Session, BackendError> {
        self.record(format!("sign_in:{display_name}"));
        Self::failure(&self.sign_in_failure)?;

        let user_id = self.next_id("guest");
        self.put_profile(guest_profile(&user_id, display_name));
        Ok(guest_session(&user_id, display_name))
    }
}

#[async_trait]
impl AccountAuth for FakeBackend {
    async fn register(
        &self,
        email: &str,
        display_name: Option<&str>,
    ) -> Result<Session, BackendError> {
        self.record(format!("register:{email}"));

        let user_id = self.next_id("user");
        let mut profile = registered_profile(&user_id, display_name);
        profile.email = Some(email.to_string());
        self.put_profile(profile);
        Ok(registered_session(&user_id))
    }

    async fn sign_in(&self, email: &str) -> Result<Session, BackendError> {
        self.record(format!("account_sign_in:{email}"));

        let user_id = self
            .profiles
            .lock()
            .expect("profiles lock")
            .values()
            .find(|profile| !profile.is_anonymous && profile.email.as_deref() == Some(email))
            .map(|profile| profile.user_id.clone());
        user_id
            .map(|user_id| registered_session(&user_id))
            .ok_or_else(|| upstream(404))
    }
}

#[async_trait]
impl ProfileProvider for FakeBackend {
    async fn fetch_profile(&self, user_id: &str) -> Result<Option<Profile>, BackendError> {
        self.record(format!("profile:{user_id}"));
        Self::failure(&self.profile_failure)?;
        Ok(self.profile(user_id))
    }
}

#[async_trait]
impl RoomGateway for FakeBackend {
    async fn exchange_token(
        &self,
        session: &Session,
        request: TokenExchange,
    ) -> Result<JoinResult, BackendError> {
        self.record(format!("exchange:{}", request.code.as_str()));
        self.exchanges
            .lock()
            .expect("exchanges lock")
            .push((session.user_id.clone(), request));

        let gate = self.exchange_gate.lock().expect("gate lock").clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        Self::failure(&self.exchange_failure)?;
        Ok(join_result(session.is_anonymous))
    }
}

#[async_trait]
impl IdentityMerge for FakeBackend {
    async fn upgrade_identity(
        &self,
        session: &Session,
        request: IdentityUpgrade,
    ) -> Result<UpgradeReceipt, BackendError> {
        self.record(format!("upgrade:{}", request.guest_user_id));
        self.merges
            .lock()
            .expect("merges lock")
            .push((session.user_id.clone(), request.clone()));
        Self::failure(&self.merge_failure)?;

        Ok(UpgradeReceipt {
            converted: true,
            display_name: request.display_name,
            reattributed_activity: 1,
        })
    }
}

/// Session storage double that records every save.
#[derive(Default)]
pub(crate) struct RecordingStorage {
    state: Mutex<StoredState>,
    saves: Mutex<Vec<StoredState>>,
    fail_load: Mutex<bool>,
    fail_save: Mutex<bool>,
}

impl RecordingStorage {
    pub(crate) fn holding(state: StoredState) -> Self {
        Self {
            state: Mutex::new(state),
            ..Self::default()
        }
    }

    pub(crate) fn with_session(session: Session) -> Self {
        Self::holding(StoredState {
            session: Some(session),
            pending_upgrade: None,
        })
    }

    pub(crate) fn with_pending(session: Session, pending: PendingUpgrade) -> Self {
        Self::holding(StoredState {
            session: Some(session),
            pending_upgrade: Some(pending),
        })
    }

    pub(crate) fn fail_loads(&self) {
        *self.fail_load.lock().expect("flag lock") = true;
    }

    pub(crate) fn fail_saves(&self) {
        *self.fail_save.lock().expect("flag lock") = true;
    }

    pub(crate) fn current(&self) -> StoredState {
        self.state.lock().expect("state lock").clone()
    }

    pub(crate) fn saves(&self) -> Vec<StoredState> {
        self.saves.lock().expect("saves lock").clone()
    }
}

#[async_trait]
impl SessionStorage for RecordingStorage {
    async fn load(&self) -> Result<StoredState, StorageError> {
        if *self.fail_load.lock().expect("flag lock") {
            return Err(StorageError("load failed".to_string()));
        }
        Ok(self.current())
    }

    async fn save(&self, state: &StoredState) -> Result<(), StorageError> {
        self.saves.lock().expect("saves lock").push(state.clone());
        if *self.fail_save.lock().expect("flag lock") {
            return Err(StorageError("save failed".to_string()));
        }
        *self.state.lock().expect("state lock") = state.clone();
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct RecordingNavigator {
    visits: Mutex<Vec<JoinResult>>,
}

impl RecordingNavigator {
    pub(crate) fn visits(&self) -> Vec<JoinResult> {
        self.visits.lock().expect("visits lock").clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, result: &JoinResult) {
        self.visits.lock().expect("visits lock").push(result.clone());
    }
}

pub(crate) struct Harness {
    pub(crate) backend: Arc<FakeBackend>,
    pub(crate) storage: Arc<RecordingStorage>,
    pub(crate) navigator: Arc<RecordingNavigator>,
}

impl Harness {
    pub(crate) fn new(backend: FakeBackend, storage: RecordingStorage) -> Self {
        Self {
            backend: Arc::new(backend),
            storage: Arc::new(storage),
            navigator: Arc::new(RecordingNavigator::default()),
        }
    }

    pub(crate) fn ports(&self) -> JoinPorts {
        JoinPorts {
            anonymous_auth: self.backend.clone(),
            account_auth: self.backend.clone(),
            profiles: self.backend.clone(),
            rooms: self.backend.clone(),
            merge: self.backend.clone(),
            storage: self.storage.clone(),
            navigator: self.navigator.clone(),
            clock: Arc::new(FixedClock(NOW)),
        }
    }
}
