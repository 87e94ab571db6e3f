//! SQLite implementation of the store traits.
//!
//! This is the primary storage backend. It uses rusqlite with bundled
//! SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use maestro_core::{MetaId, Role, User, UserId};

use crate::error::{Result, StoreError};
use crate::migration::{self, now_millis};
use crate::traits::{AddResult, AttributeStore, UpdateResult, UserDirectory};

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a closure against the connection on the blocking pool.
    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Poisoned(e.to_string()))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

fn user_param(id: UserId) -> Result<i64> {
    i64::try_from(id.get()).map_err(|_| StoreError::InvalidData(format!("user id {} out of range", id)))
}

#[async_trait]
impl AttributeStore for SqliteStore {
    async fn get_attribute(&self, user: UserId, name: &str) -> Result<Option<String>> {
        let user = user_param(user)?;
        let name = name.to_string();

        self.run(move |conn| {
            conn.query_row(
                "SELECT meta_value FROM user_meta
                 WHERE user_id = ?1 AND meta_key = ?2
                 ORDER BY meta_id LIMIT 1",
                params![user, name],
                |row| row.get(0),
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn add_attribute(
        &self,
        user: UserId,
        name: &str,
        value: &str,
        unique: bool,
    ) -> Result<AddResult> {
        let user = user_param(user)?;
        let name = name.to_string();
        let value = value.to_string();

        self.run(move |conn| {
            let inserted = if unique {
                // Single statement so the existence check and insert are atomic.
                conn.execute(
                    "INSERT INTO user_meta (user_id, meta_key, meta_value)
                     SELECT ?1, ?2, ?3
                     WHERE NOT EXISTS (
                         SELECT 1 FROM user_meta WHERE user_id = ?1 AND meta_key = ?2
                     )",
                    params![user, name, value],
                )?
            } else {
                conn.execute(
                    "INSERT INTO user_meta (user_id, meta_key, meta_value) VALUES (?1, ?2, ?3)",
                    params![user, name, value],
                )?
            };

            if inserted == 0 {
                Ok(AddResult::AlreadyExists)
            } else {
                Ok(AddResult::Added(MetaId(conn.last_insert_rowid())))
            }
        })
        .await
    }

    async fn update_attribute(
        &self,
        user: UserId,
        name: &str,
        value: &str,
        expected: Option<&str>,
    ) -> Result<UpdateResult> {
        let user = user_param(user)?;
        let name = name.to_string();
        let value = value.to_string();
        let expected = expected.map(str::to_string);

        self.run(move |conn| {
            let tx = conn.transaction()?;

            let stored: Vec<String> = {
                let mut stmt = tx.prepare(
                    "SELECT meta_value FROM user_meta WHERE user_id = ?1 AND meta_key = ?2",
                )?;
                let rows = stmt.query_map(params![user, name], |row| row.get(0))?;
                rows.collect::<rusqlite::Result<Vec<String>>>()?
            };

            if stored.is_empty() {
                return Ok(UpdateResult::Missing);
            }

            if let Some(expected) = &expected {
                if !stored.contains(expected) {
                    return Ok(UpdateResult::Conflict);
                }
            }

            if stored.iter().all(|v| *v == value) {
                return Ok(UpdateResult::Unchanged);
            }

            match &expected {
                Some(expected) => tx.execute(
                    "UPDATE user_meta SET meta_value = ?3
                     WHERE user_id = ?1 AND meta_key = ?2 AND meta_value = ?4",
                    params![user, name, value, expected],
                )?,
                None => tx.execute(
                    "UPDATE user_meta SET meta_value = ?3 WHERE user_id = ?1 AND meta_key = ?2",
                    params![user, name, value],
                )?,
            };

            tx.commit()?;
            Ok(UpdateResult::Updated)
        })
        .await
    }

    async fn delete_attribute(&self, user: UserId, name: &str) -> Result<bool> {
        let user = user_param(user)?;
        let name = name.to_string();

        self.run(move |conn| {
            let deleted = conn.execute(
                "DELETE FROM user_meta WHERE user_id = ?1 AND meta_key = ?2",
                params![user, name],
            )?;
            Ok(deleted > 0)
        })
        .await
    }
}

#[async_trait]
impl UserDirectory for SqliteStore {
    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let raw = user_param(id)?;

        let row: Option<(String, String)> = self
            .run(move |conn| {
                conn.query_row(
                    "SELECT login, role FROM users WHERE id = ?1",
                    params![raw],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()
                .map_err(StoreError::from)
            })
            .await?;

        match row {
            Some((login, role)) => Ok(Some(User::new(id, login, Role::new(role)?))),
            None => Ok(None),
        }
    }

    async fn set_role(&self, id: UserId, role: &Role) -> Result<bool> {
        let raw = user_param(id)?;
        let role = role.as_str().to_string();

        self.run(move |conn| {
            let updated = conn.execute(
                "UPDATE users SET role = ?2 WHERE id = ?1",
                params![raw, role],
            )?;
            Ok(updated > 0)
        })
        .await
    }

    async fn insert_user(&self, login: &str, role: &Role) -> Result<UserId> {
        let login = login.to_string();
        let role = role.as_str().to_string();

        let rowid = self
            .run(move |conn| {
                conn.execute(
                    "INSERT INTO users (login, role, created_at) VALUES (?1, ?2, ?3)",
                    params![login, role, now_millis()],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await?;

        u64::try_from(rowid)
            .map(UserId)
            .map_err(|_| StoreError::InvalidData(format!("negative user id {}", rowid)))
    }

    async fn delete_user(&self, id: UserId) -> Result<bool> {
        let raw = user_param(id)?;

        self.run(move |conn| {
            let tx = conn.transaction()?;
            let deleted = tx.execute("DELETE FROM users WHERE id = ?1", params![raw])?;
            if deleted > 0 {
                tx.execute("DELETE FROM user_meta WHERE user_id = ?1", params![raw])?;
            }
            tx.commit()?;
            Ok(deleted > 0)
        })
        .await
    }
}
