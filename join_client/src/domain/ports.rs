use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::errors::{BackendError, StorageError};
use crate::domain::identity::{PendingUpgrade, Profile, Session};
use crate::domain::join::{IdentityUpgrade, JoinResult, TokenExchange, UpgradeReceipt};

// The use cases depend on these traits, not on the reqwest or file adapters.

// Port for creating anonymous sessions with creation-time metadata.
#[async_trait]
pub trait AnonymousAuth: Send + Sync {
    async fn sign_in_anonymously(&self, display_name: &str) -> Result<Session, BackendError>;
}

// Port for durable accounts; credentials are the provider's concern.
#[async_trait]
pub trait AccountAuth: Send + Sync {
    async fn register(
        &self,
        email: &str,
        display_name: Option<&str>,
    ) -> Result<Session, BackendError>;
    async fn sign_in(&self, email: &str) -> Result<Session, BackendError>;
}

// Port for profile lookup; `Ok(None)` when the user has no profile.
#[async_trait]
pub trait ProfileProvider: Send + Sync {
    async fn fetch_profile(&self, user_id: &str) -> Result<Option<Profile>, BackendError>;
}

// Port for exchanging a room code for document access.
#[async_trait]
pub trait RoomGateway: Send + Sync {
    async fn exchange_token(
        &self,
        session: &Session,
        request: TokenExchange,
    ) -> Result<JoinResult, BackendError>;
}

// Port for the guest-to-registered merge RPC, called as the new identity.
#[async_trait]
pub trait IdentityMerge: Send + Sync {
    async fn upgrade_identity(
        &self,
        session: &Session,
        request: IdentityUpgrade,
    ) -> Result<UpgradeReceipt, BackendError>;
}

/// Everything the client keeps between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredState {
    #[serde(default)]
    pub session: Option<Session>,
    #[serde(default)]
    pub pending_upgrade: Option<PendingUpgrade>,
}

// Port for the local session store; last write wins.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn load(&self) -> Result<StoredState, StorageError>;
    async fn save(&self, state: &StoredState) -> Result<(), StorageError>;
}

// Receives the join result once the flow succeeds.
pub trait Navigator: Send + Sync {
    fn navigate(&self, result: &JoinResult);
}

// Port for retrieving the current time.
pub trait Clock: Send + Sync {
    fn now_epoch_seconds(&self) -> u64;
}

/// Shared handles to every collaborator of the join flow.
#[derive(Clone)]
pub struct JoinPorts {
    pub anonymous_auth: Arc<dyn AnonymousAuth>,
    pub account_auth: Arc<dyn AccountAuth>,
    pub profiles: Arc<dyn ProfileProvider>,
    pub rooms: Arc<dyn RoomGateway>,
    pub merge: Arc<dyn IdentityMerge>,
    pub storage: Arc<dyn SessionStorage>,
    pub navigator: Arc<dyn Navigator>,
    pub clock: Arc<dyn Clock>,
}
