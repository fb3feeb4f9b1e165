use crate::domain::errors::StorageError;
use crate::domain::ports::{SessionStorage, StoredState};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

// JSON file store for the session and any pending upgrade.
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn staging_path(&self) -> PathBuf {
        let mut staged = self.path.clone().into_os_string();
        staged.push(".tmp");
        PathBuf::from(staged)
    }
}

#[async_trait]
impl SessionStorage for FileSessionStorage {
    async fn load(&self) -> Result<StoredState, StorageError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(StoredState::default()),
            Err(err) => return Err(StorageError(err.to_string())),
        };

        serde_json::from_slice(&raw).map_err(|err| StorageError(err.to_string()))
    }

    async fn save(&self, state: &StoredState) -> Result<(), StorageError> {
        let raw = serde_json::to_vec_pretty(state).map_err(|err| StorageError(err.to_string()))?;
        let staged = self.staging_path();

        // Replace in one rename so readers never see a half-written file.
        tokio::fs::write(&staged, raw)
            .await
            .map_err(|err| StorageError(err.to_string()))?;
        tokio::fs::rename(&staged, &self.path)
            .await
            .map_err(|err| StorageError(err.to_string()))
    }
}

// Process-local store for tests and ephemeral runs.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStorage {
    state: Arc<Mutex<StoredState>>,
}

impl InMemorySessionStorage {
    pub fn new(state: StoredState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }
}

#[async_trait]
impl SessionStorage for InMemorySessionStorage {
    async fn load(&self) -> Result<StoredState, StorageError> {
        Ok(self.state.lock().await.clone())
    }

    async fn save(&self, state: &StoredState) -> Result<(), StorageError> {
        *self.state.lock().await = state.clone();
        Ok(())
    }
}
