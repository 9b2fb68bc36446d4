//! Session token storage
//!
//! The bearer token lives behind a [`TokenStore`] so dashboards can be driven
//! without a real storage backend. The token is never validated locally; the
//! API's 401 responses are the only authority.

use crate::error::{CoreError, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Key the token is stored under
pub const TOKEN_KEY: &str = "token";

/// Read/write/clear access to the stored bearer token
pub trait TokenStore: Send + Sync {
    fn read(&self) -> Option<String>;
    fn write(&self, token: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Process-local token store
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn read(&self) -> Option<String> {
        self.token.read().clone()
    }

    fn write(&self, token: &str) -> Result<()> {
        *self.token.write() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.token.write() = None;
        Ok(())
    }
}

/// JSON key/value file, the on-disk analogue of browser local storage.
///
/// Other keys in the file are preserved when the token is written or cleared.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_map(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let content = std::fs::read_to_string(&self.path).map_err(|source| CoreError::FileRead {
            path: self.path.clone(),
            source,
        })?;
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) | Err(_) => {
                warn!(path = %self.path.display(), "Session file is not a JSON object, starting fresh");
                Ok(Map::new())
            }
        }
    }

    fn save_map(&self, map: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| CoreError::FileWrite {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let content = serde_json::to_string_pretty(map).unwrap_or_else(|_| "{}".to_string());
        std::fs::write(&self.path, content).map_err(|source| CoreError::FileWrite {
            path: self.path.clone(),
            source,
        })
    }
}

impl TokenStore for FileTokenStore {
    fn read(&self) -> Option<String> {
        match self.load_map() {
            Ok(map) => map
                .get(TOKEN_KEY)
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            Err(e) => {
                warn!(error = %e, "Failed to read session file");
                None
            }
        }
    }

    fn write(&self, token: &str) -> Result<()> {
        let mut map = self.load_map()?;
        map.insert(TOKEN_KEY.to_string(), Value::String(token.to_string()));
        self.save_map(&map)?;
        debug!(path = %self.path.display(), "Stored session token");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut map = self.load_map()?;
        if map.remove(TOKEN_KEY).is_some() {
            self.save_map(&map)?;
            debug!(path = %self.path.display(), "Cleared session token");
        }
        Ok(())
    }
}

/// Explicitly passed session context
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn TokenStore>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl Session {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    /// Session with no stored token, used by the public site
    pub fn anonymous() -> Self {
        Self::new(Arc::new(MemoryTokenStore::new()))
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self::new(Arc::new(MemoryTokenStore::with_token(token)))
    }

    pub fn token(&self) -> Option<String> {
        self.store.read()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn login(&self, token: &str) -> Result<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(CoreError::validation("Token must not be empty"));
        }
        self.store.write(token)
    }

    /// Drop the stored token. Failures are logged, never surfaced.
    pub fn logout(&self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear session token");
        }
    }

    /// Display name decoded from the token payload
    pub fn display_name(&self) -> Option<String> {
        self.token().as_deref().and_then(display_name_from_jwt)
    }
}

/// Extract a display name from an unverified JWT payload.
///
/// Looks at `name`, `username` and `email`, in that order.
pub fn display_name_from_jwt(token: &str) -> Option<String> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    let claims: Value = serde_json::from_slice(&bytes).ok()?;

    ["name", "username", "email"]
        .iter()
        .filter_map(|key| claims.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn jwt(payload: &str) -> String {
        format!(
            "{}.{}.signature",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let session = Session::anonymous();
        assert!(!session.is_authenticated());

        session.login("abc").unwrap();
        assert_eq!(session.token().as_deref(), Some("abc"));

        session.logout();
        assert!(session.token().is_none());
    }

    #[test]
    fn test_login_rejects_blank_token() {
        let session = Session::anonymous();
        assert!(session.login("   ").is_err());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_file_store_persists_and_preserves_other_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("session.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"theme":"dark"}"#).unwrap();

        let store = FileTokenStore::new(&path);
        store.write("tok-1").unwrap();
        assert_eq!(FileTokenStore::new(&path).read().as_deref(), Some("tok-1"));

        store.clear().unwrap();
        assert!(store.read().is_none());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("theme"));
        assert!(!content.contains("tok-1"));
    }

    #[test]
    fn test_file_store_tolerates_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileTokenStore::new(&path);
        assert!(store.read().is_none());
        store.write("fresh").unwrap();
        assert_eq!(store.read().as_deref(), Some("fresh"));
    }

    #[test]
    fn test_display_name_lookup_order() {
        assert_eq!(
            display_name_from_jwt(&jwt(r#"{"name":"Siam","email":"s@x.io"}"#)).as_deref(),
            Some("Siam")
        );
        assert_eq!(
            display_name_from_jwt(&jwt(r#"{"username":"admin"}"#)).as_deref(),
            Some("admin")
        );
        assert_eq!(
            display_name_from_jwt(&jwt(r#"{"name":"","email":"s@x.io"}"#)).as_deref(),
            Some("s@x.io")
        );
        assert!(display_name_from_jwt(&jwt(r#"{"sub":"1"}"#)).is_none());
        assert!(display_name_from_jwt("not-a-jwt").is_none());
    }

    #[test]
    fn test_session_display_name() {
        let session = Session::with_token(jwt(r#"{"name":"Amin"}"#));
        assert_eq!(session.display_name().as_deref(), Some("Amin"));
    }
}
