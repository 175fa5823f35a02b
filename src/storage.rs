/// Credential and prompt persistence over chrome.storage.local
///
/// Every mutation is a read-modify-write of the whole list: read the stored
/// list, apply one change in memory, write the full list back, then re-read
/// it so callers always render what storage actually holds.
use crate::config::{LEGACY_CREDENTIAL_KEY, MIGRATED_CREDENTIAL_NAME};
use crate::error::ExtensionError;
use crate::records::{Credential, Prompt, Record};
use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::marker::PhantomData;
use std::rc::Rc;

/// Key/value storage provided by the extension host
#[async_trait(?Send)]
pub trait StorageArea {
    /// Read a value; `None` when the key is absent
    async fn get(&self, key: &str) -> Result<Option<Value>, ExtensionError>;

    async fn set(&self, key: &str, value: Value) -> Result<(), ExtensionError>;

    async fn remove(&self, key: &str) -> Result<(), ExtensionError>;
}

/// In-memory copy of one stored list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct RecordList<T> {
    pub items: Vec<T>,
}

impl<T> RecordList<T> {
    pub fn new() -> Self {
        RecordList { items: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn replace(&mut self, index: usize, item: T) -> Result<(), ExtensionError> {
        let len = self.items.len();
        let slot = self
            .items
            .get_mut(index)
            .ok_or(ExtensionError::IndexOutOfRange { index, len })?;
        *slot = item;
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<T, ExtensionError> {
        if index >= self.items.len() {
            return Err(ExtensionError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(index))
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

impl<T> Default for RecordList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// CRUD over the list of `T` stored under `T::STORAGE_KEY`
pub struct RecordStore<T: Record> {
    storage: Rc<dyn StorageArea>,
    _record: PhantomData<fn() -> T>,
}

pub type CredentialStore = RecordStore<Credential>;
pub type PromptStore = RecordStore<Prompt>;

impl<T: Record> Clone for RecordStore<T> {
    fn clone(&self) -> Self {
        RecordStore {
            storage: Rc::clone(&self.storage),
            _record: PhantomData,
        }
    }
}

impl<T: Record> RecordStore<T> {
    pub fn new(storage: Rc<dyn StorageArea>) -> Self {
        RecordStore {
            storage,
            _record: PhantomData,
        }
    }

    /// Current list, empty when nothing has been stored yet
    pub async fn list(&self) -> Result<Vec<T>, ExtensionError> {
        Ok(self.load().await?.into_items())
    }

    pub async fn get(&self, index: usize) -> Result<T, ExtensionError> {
        let list = self.load().await?;
        list.get(index)
            .cloned()
            .ok_or(ExtensionError::IndexOutOfRange {
                index,
                len: list.len(),
            })
    }

    /// Append an entry; returns the list as re-read from storage
    pub async fn add(&self, item: T) -> Result<Vec<T>, ExtensionError> {
        let mut list = self.load().await?;
        list.push(item);
        self.store(&list).await?;
        self.list().await
    }

    /// Replace the entry at `index` in place
    pub async fn update(&self, index: usize, item: T) -> Result<Vec<T>, ExtensionError> {
        let mut list = self.load().await?;
        list.replace(index, item)?;
        self.store(&list).await?;
        self.list().await
    }

    /// Splice out the entry at `index`
    pub async fn remove(&self, index: usize) -> Result<Vec<T>, ExtensionError> {
        let mut list = self.load().await?;
        let removed = list.remove(index)?;
        debug!("Removing {} entry '{}'", T::STORAGE_KEY, removed.label());
        self.store(&list).await?;
        self.list().await
    }

    /// Form submission: update when editing an existing position, append otherwise
    pub async fn save(&self, editing: Option<usize>, item: T) -> Result<Vec<T>, ExtensionError> {
        match editing {
            Some(index) => self.update(index, item).await,
            None => self.add(item).await,
        }
    }

    async fn load(&self) -> Result<RecordList<T>, ExtensionError> {
        match self.storage.get(T::STORAGE_KEY).await? {
            None | Some(Value::Null) => Ok(RecordList::new()),
            Some(value) => Ok(serde_json::from_value(value)?),
        }
    }

    async fn store(&self, list: &RecordList<T>) -> Result<(), ExtensionError> {
        let value = serde_json::to_value(list)?;
        self.storage.set(T::STORAGE_KEY, value).await
    }
}

impl RecordStore<Credential> {
    /// Fold the legacy single-key record into the credential list.
    ///
    /// With an empty list the legacy key becomes a one-element list named
    /// "Default". The legacy record is removed in every case, so a second
    /// run finds nothing to do. Returns the migrated credential, if any.
    pub async fn migrate_legacy(&self) -> Result<Option<Credential>, ExtensionError> {
        let legacy = match self.storage.get(LEGACY_CREDENTIAL_KEY).await? {
            Some(Value::String(key)) if !key.is_empty() => key,
            _ => return Ok(None),
        };

        let list = self.load().await?;
        let migrated = if list.is_empty() {
            let credential = Credential::new(MIGRATED_CREDENTIAL_NAME, legacy);
            let mut list = RecordList::new();
            list.push(credential.clone());
            self.store(&list).await?;
            info!("Old API key migrated.");
            Some(credential)
        } else {
            warn!("Discarding legacy API key: credential list already populated");
            None
        };

        self.storage.remove(LEGACY_CREDENTIAL_KEY).await?;
        Ok(migrated)
    }

    /// List credentials, migrating the legacy record first when the list is empty
    pub async fn list_or_migrate(&self) -> Result<Vec<Credential>, ExtensionError> {
        let credentials = self.list().await?;
        if !credentials.is_empty() {
            return Ok(credentials);
        }
        match self.migrate_legacy().await? {
            Some(_) => self.list().await,
            None => Ok(credentials),
        }
    }
}
