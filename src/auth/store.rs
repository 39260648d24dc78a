// Durable token storage backed by a SQLite key-value table

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

/// Storage keys. These must round-trip exactly, other tooling reads the
/// same table.
const ACCESS_TOKEN_KEY: &str = "access_token";
const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Persistent store for the access/refresh token pair.
///
/// Both tokens are written together and cleared together; the store never
/// holds one without the other under normal operation. All operations are
/// synchronous and fail only on storage-medium errors, which callers treat
/// as unrecoverable.
pub struct TokenStore {
    conn: Mutex<Connection>,
}

impl TokenStore {
    /// Open (or create) a token store at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create token store directory: {}", parent.display())
            })?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open token store: {}", path.display()))?;

        Self::init(conn)
    }

    /// Open an in-memory store. Used by tests and ephemeral sessions.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory token store")?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS auth_kv (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
            [],
        )
        .context("Failed to initialize token store schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Store both tokens. No format validation is applied.
    pub fn set_tokens(&self, access_token: &str, refresh_token: &str) -> Result<()> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO auth_kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [ACCESS_TOKEN_KEY, access_token],
        )
        .context("Failed to store access token")?;
        conn.execute(
            "INSERT INTO auth_kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [REFRESH_TOKEN_KEY, refresh_token],
        )
        .context("Failed to store refresh token")?;
        Ok(())
    }

    /// Get the stored access token, if any.
    pub fn access_token(&self) -> Result<Option<String>> {
        self.get(ACCESS_TOKEN_KEY)
    }

    /// Get the stored refresh token, if any.
    pub fn refresh_token(&self) -> Result<Option<String>> {
        self.get(REFRESH_TOKEN_KEY)
    }

    /// Remove both tokens. Clearing an already-empty store is a no-op.
    pub fn clear(&self) -> Result<()> {
        self.lock()
            .execute(
                "DELETE FROM auth_kv WHERE key IN (?1, ?2)",
                [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY],
            )
            .context("Failed to clear tokens")?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        self.lock()
            .query_row("SELECT value FROM auth_kv WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()
            .with_context(|| format!("Failed to read '{}' from token store", key))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        // A poisoned lock only means a previous holder panicked; the
        // connection itself is still usable.
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get_tokens() {
        let store = TokenStore::open_in_memory().unwrap();

        assert_eq!(store.access_token().unwrap(), None);
        assert_eq!(store.refresh_token().unwrap(), None);

        store.set_tokens("access-abc", "refresh-xyz").unwrap();
        assert_eq!(store.access_token().unwrap(), Some("access-abc".to_string()));
        assert_eq!(store.refresh_token().unwrap(), Some("refresh-xyz".to_string()));
    }

    #[test]
    fn test_set_tokens_overwrites() {
        let store = TokenStore::open_in_memory().unwrap();

        store.set_tokens("a1", "r1").unwrap();
        store.set_tokens("a2", "r2").unwrap();

        assert_eq!(store.access_token().unwrap(), Some("a2".to_string()));
        assert_eq!(store.refresh_token().unwrap(), Some("r2".to_string()));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let store = TokenStore::open_in_memory().unwrap();

        store.set_tokens("a", "r").unwrap();
        store.clear().unwrap();
        assert_eq!(store.access_token().unwrap(), None);
        assert_eq!(store.refresh_token().unwrap(), None);

        // Clearing again must not error
        store.clear().unwrap();
        assert_eq!(store.access_token().unwrap(), None);
        assert_eq!(store.refresh_token().unwrap(), None);
    }

    #[test]
    fn test_open_creates_parent_directory() {
        let dir = std::env::temp_dir().join(format!("bottles-cli-test-{}", std::process::id()));
        let path = dir.join("nested").join("tokens.db");

        let store = TokenStore::open(&path).unwrap();
        store.set_tokens("a", "r").unwrap();
        drop(store);

        // Reopen and verify persistence
        let store = TokenStore::open(&path).unwrap();
        assert_eq!(store.access_token().unwrap(), Some("a".to_string()));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
