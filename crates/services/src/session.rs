use crate::backend::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// The authenticated identity state held after login. A session exists iff
/// the user is authenticated; its token is opaque here and validated by the
/// backend on every authenticated request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(token: String, user: User) -> Self {
        Self {
            token,
            user,
            created_at: Utc::now(),
        }
    }
}

/// Sole owner of the current session. Injected explicitly wherever it is
/// needed so tests can construct isolated instances; no ambient singleton.
///
/// The session is mirrored to a JSON file so it survives restarts until
/// `logout()` (the analog of the original client's browser storage).
#[derive(Debug)]
pub struct SessionStore {
    current: RwLock<Option<Session>>,
    storage_path: Option<PathBuf>,
    loading: AtomicBool,
}

impl SessionStore {
    /// `storage_path: None` disables persistence (used by tests)
    pub fn new(storage_path: Option<PathBuf>) -> Self {
        Self {
            current: RwLock::new(None),
            storage_path,
            loading: AtomicBool::new(true),
        }
    }

    /// One-time load of a persisted session. `is_loading()` is true only
    /// until this completes, never afterwards. A corrupt file hydrates to
    /// "no session".
    pub async fn hydrate(&self) {
        if let Some(path) = &self.storage_path {
            match tokio::fs::read_to_string(path).await {
                Ok(raw) => match serde_json::from_str::<Session>(&raw) {
                    Ok(session) => {
                        debug!(username = %session.user.username, "Restored persisted session");
                        *self.current.write().await = Some(session);
                    }
                    Err(e) => {
                        warn!(error = %e, "Persisted session is unreadable, starting unauthenticated");
                    }
                },
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(error = %e, "Could not read persisted session");
                }
            }
        }
        self.loading.store(false, Ordering::Release);
    }

    /// True only during the store's initial hydration
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Unconditionally replace the current session
    pub async fn login(&self, token: String, user: User) {
        let session = Session::new(token, user);
        debug!(username = %session.user.username, "Session established");
        self.persist(&session).await;
        *self.current.write().await = Some(session);
    }

    /// Clear the session and its persisted copy
    pub async fn logout(&self) {
        *self.current.write().await = None;
        if let Some(path) = &self.storage_path {
            if let Err(e) = tokio::fs::remove_file(path).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(error = %e, "Could not remove persisted session");
                }
            }
        }
        debug!("Session cleared");
    }

    pub async fn current(&self) -> Option<Session> {
        self.current.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.current.read().await.is_some()
    }

    async fn persist(&self, session: &Session) {
        let Some(path) = &self.storage_path else {
            return;
        };
        // Losing persistence only costs the user a re-login after restart,
        // so a write failure must not fail login itself.
        let result = match serde_json::to_string(session) {
            Ok(raw) => tokio::fs::write(path, raw).await,
            Err(e) => Err(std::io::Error::other(e.to_string())),
        };
        if let Err(e) = result {
            warn!(error = %e, path = %path.display(), "Could not persist session");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;

    #[tokio::test]
    async fn test_login_overwrites_and_logout_clears() {
        let store = SessionStore::new(None);
        store.hydrate().await;
        assert!(!store.is_loading());
        assert!(!store.is_authenticated().await);

        store.login("t1".to_string(), MockBackend::mock_user()).await;
        assert!(store.is_authenticated().await);
        assert_eq!(store.current().await.unwrap().token, "t1");

        let mut other = MockBackend::mock_user();
        other.username = "grace".to_string();
        store.login("t2".to_string(), other).await;
        let session = store.current().await.unwrap();
        assert_eq!(session.token, "t2");
        assert_eq!(session.user.username, "grace");

        store.logout().await;
        assert!(!store.is_authenticated().await);
        assert!(store.current().await.is_none());
    }

    #[tokio::test]
    async fn test_is_loading_only_during_hydration() {
        let store = SessionStore::new(None);
        assert!(store.is_loading());
        store.hydrate().await;
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_session_survives_restart_until_logout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = SessionStore::new(Some(path.clone()));
        store.hydrate().await;
        store.login("persisted".to_string(), MockBackend::mock_user()).await;

        // "Restart": a new store over the same file
        let restarted = SessionStore::new(Some(path.clone()));
        restarted.hydrate().await;
        let session = restarted.current().await.unwrap();
        assert_eq!(session.token, "persisted");
        assert_eq!(session.user, MockBackend::mock_user());

        restarted.logout().await;
        let after_logout = SessionStore::new(Some(path));
        after_logout.hydrate().await;
        assert!(after_logout.current().await.is_none());
    }

    #[tokio::test]
    async fn test_login_writes_storage_file_and_logout_removes_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = SessionStore::new(Some(path.clone()));
        store.hydrate().await;
        assert!(!path.exists());

        store.login("t1".to_string(), MockBackend::mock_user()).await;
        let raw = std::fs::read_to_string(&path).unwrap();
        let on_disk: Session = serde_json::from_str(&raw).unwrap();
        assert_eq!(on_disk.token, "t1");
        assert_eq!(on_disk.user, MockBackend::mock_user());

        store.logout().await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_corrupt_persisted_session_hydrates_to_unauthenticated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = SessionStore::new(Some(path));
        store.hydrate().await;
        assert!(!store.is_loading());
        assert!(!store.is_authenticated().await);
    }
}
