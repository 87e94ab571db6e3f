//! In-memory implementation of the store traits.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use maestro_core::{MetaId, Role, User, UserId};

use crate::error::{Result, StoreError};
use crate::traits::{AddResult, AttributeStore, UpdateResult, UserDirectory};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

struct MemoryStoreInner {
    /// Attribute rows per (user, name), oldest first.
    attributes: HashMap<(UserId, String), Vec<MetaRow>>,

    /// Users by id.
    users: BTreeMap<UserId, User>,

    next_meta_id: i64,
    next_user_id: u64,
}

struct MetaRow {
    meta_id: MetaId,
    value: String,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner {
                attributes: HashMap::new(),
                users: BTreeMap::new(),
                next_meta_id: 1,
                next_user_id: 1,
            }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AttributeStore for MemoryStore {
    async fn get_attribute(&self, user: UserId, name: &str) -> Result<Option<String>> {
        let inner = self.read()?;
        Ok(inner
            .attributes
            .get(&(user, name.to_string()))
            .and_then(|rows| rows.first())
            .map(|row| row.value.clone()))
    }

    async fn add_attribute(
        &self,
        user: UserId,
        name: &str,
        value: &str,
        unique: bool,
    ) -> Result<AddResult> {
        let mut inner = self.write()?;

        let slot = (user, name.to_string());
        // Check and insert under one write lock
        if unique && inner.attributes.get(&slot).is_some_and(|rows| !rows.is_empty()) {
            return Ok(AddResult::AlreadyExists);
        }

        let meta_id = MetaId(inner.next_meta_id);
        inner.next_meta_id += 1;
        inner.attributes.entry(slot).or_default().push(MetaRow {
            meta_id,
            value: value.to_string(),
        });

        Ok(AddResult::Added(meta_id))
    }

    async fn update_attribute(
        &self,
        user: UserId,
        name: &str,
        value: &str,
        expected: Option<&str>,
    ) -> Result<UpdateResult> {
        let mut inner = self.write()?;

        let Some(rows) = inner.attributes.get_mut(&(user, name.to_string())) else {
            return Ok(UpdateResult::Missing);
        };
        if rows.is_empty() {
            return Ok(UpdateResult::Missing);
        }

        if let Some(expected) = expected {
            if !rows.iter().any(|row| row.value == expected) {
                return Ok(UpdateResult::Conflict);
            }
        }

        if rows.iter().all(|row| row.value == value) {
            return Ok(UpdateResult::Unchanged);
        }

        // Only rows still holding the expected value are written
        for row in rows.iter_mut() {
            if expected.map_or(true, |e| row.value == e) {
                row.value = value.to_string();
            }
        }

        Ok(UpdateResult::Updated)
    }

    async fn delete_attribute(&self, user: UserId, name: &str) -> Result<bool> {
        let mut inner = self.write()?;
        Ok(inner
            .attributes
            .remove(&(user, name.to_string()))
            .is_some_and(|rows| !rows.is_empty()))
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let inner = self.read()?;
        Ok(inner.users.get(&id).cloned())
    }

    async fn set_role(&self, id: UserId, role: &Role) -> Result<bool> {
        let mut inner = self.write()?;
        match inner.users.get_mut(&id) {
            Some(user) => {
                user.role = role.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_user(&self, login: &str, role: &Role) -> Result<UserId> {
        let mut inner = self.write()?;
        let id = UserId(inner.next_user_id);
        inner.next_user_id += 1;
        inner.users.insert(id, User::new(id, login, role.clone()));
        Ok(id)
    }

    async fn delete_user(&self, id: UserId) -> Result<bool> {
        let mut inner = self.write()?;
        if inner.users.remove(&id).is_none() {
            return Ok(false);
        }
        inner.attributes.retain(|(user, _), _| *user != id);
        Ok(true)
    }
}

impl MemoryStore {
    /// Insert a user with a caller-chosen id.
    ///
    /// Replaces any existing user with that id. Later `insert_user` calls
    /// allocate ids above the highest one seen.
    pub fn insert_user_with_id(&self, user: User) -> Result<()> {
        let mut inner = self.write()?;
        inner.next_user_id = inner.next_user_id.max(user.id.get().saturating_add(1));
        inner.users.insert(user.id, user);
        Ok(())
    }

    /// Number of attribute rows stored for a user and name.
    pub fn attribute_rows(&self, user: UserId, name: &str) -> Result<usize> {
        let inner = self.read()?;
        Ok(inner
            .attributes
            .get(&(user, name.to_string()))
            .map_or(0, Vec::len))
    }
}
