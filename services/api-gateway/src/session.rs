//! Session Store
//!
//! Holds the latest costing result and shortage records per session. Uploads
//! decode first and only then take the write lock, so a failed upload never
//! touches what a session already holds.

use bomai_models::{CostingExtractionResult, ShortageRecord};
use bomai_utils::{BomAiError, BomAiResult, BuildSession};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, BuildSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions.write().await.insert(id, BuildSession::new());
        id
    }

    pub async fn ensure_exists(&self, id: Uuid) -> BomAiResult<()> {
        if self.sessions.read().await.contains_key(&id) {
            Ok(())
        } else {
            Err(session_not_found(id))
        }
    }

    /// Run a read-only query against one session
    pub async fn read<T>(&self, id: Uuid, query: impl FnOnce(&BuildSession) -> T) -> BomAiResult<T> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(&id).ok_or_else(|| session_not_found(id))?;
        Ok(query(session))
    }

    pub async fn replace_costing(&self, id: Uuid, costing: CostingExtractionResult) -> BomAiResult<()> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or_else(|| session_not_found(id))?;
        session.replace_costing(costing);
        Ok(())
    }

    pub async fn replace_records(&self, id: Uuid, records: Vec<ShortageRecord>) -> BomAiResult<()> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or_else(|| session_not_found(id))?;
        session.replace_records(records);
        Ok(())
    }

    pub async fn remove(&self, id: Uuid) -> BomAiResult<()> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| session_not_found(id))
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

fn session_not_found(id: Uuid) -> BomAiError {
    BomAiError::not_found(format!("Session {}", id))
}
