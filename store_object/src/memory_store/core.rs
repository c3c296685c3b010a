use crate::errors::StoreError;
use crate::id_type::{GeneratedId, HasUniversalId};
use crate::traits::TableMetadata;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub(crate) type Records<T> = BTreeMap<<T as TableMetadata>::Id, T>;

/// In-process record store
///
/// Records live in an ordered map behind one reader/writer lock: writes are
/// serialised, reads run concurrently. Clones share the same records.
/// Integer keys come from a per-store sequence starting at 1.
pub struct MemoryStore<T: TableMetadata> {
    pub(crate) records: Arc<RwLock<Records<T>>>,
    sequence: Arc<AtomicU64>,
}

impl<T: TableMetadata> Clone for MemoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
            sequence: Arc::clone(&self.sequence),
        }
    }
}

impl<T: TableMetadata> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TableMetadata> std::fmt::Debug for MemoryStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("table", &T::table_name())
            .field("next_id", &self.sequence.load(Ordering::Relaxed))
            .finish()
    }
}

impl<T: TableMetadata> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(BTreeMap::new())),
            sequence: Arc::new(AtomicU64::new(1)),
        }
    }

    pub(crate) fn read(&self) -> Result<RwLockReadGuard<'_, Records<T>>, StoreError> {
        self.records.read().map_err(|_| poisoned::<T>())
    }

    pub(crate) fn write(&self) -> Result<RwLockWriteGuard<'_, Records<T>>, StoreError> {
        self.records.write().map_err(|_| poisoned::<T>())
    }

    /// Validate, then insert or update `record` in `records`
    pub(crate) fn save_into(&self, records: &mut Records<T>, mut record: T) -> Result<T, StoreError> {
        record
            .validate()
            .map_err(|e| StoreError::validation(T::table_name(), e))?;

        match record.id() {
            None => {
                let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
                let id = T::Id::generate(seq).ok_or_else(|| {
                    StoreError::Configuration(format!(
                        "identifier sequence of '{}' exhausted at {}",
                        T::table_name(),
                        seq
                    ))
                })?;
                record.set_id(id.clone());
                if T::version_field().is_some() {
                    record.set_version(0);
                }
                records.insert(id, record.clone());
                Ok(record)
            }
            Some(id) => {
                let stored = records
                    .get(&id)
                    .ok_or_else(|| StoreError::not_found(T::table_name(), id.universal_id()))?;
                if let Some(version) = record.version() {
                    check_version(stored, &id, version)?;
                    record.set_version(version + 1);
                }
                records.insert(id, record.clone());
                Ok(record)
            }
        }
    }
}

/// Reject a write carrying a version other than the stored one
pub(crate) fn check_version<T: TableMetadata>(
    stored: &T,
    id: &T::Id,
    version: i64,
) -> Result<(), StoreError> {
    if stored.version() == Some(version) {
        return Ok(());
    }
    tracing::warn!(
        table = T::table_name(),
        id = %id.universal_id(),
        version,
        "stale version rejected"
    );
    Err(StoreError::conflict(
        T::table_name(),
        format!(
            "record {} was modified concurrently (version {} is stale)",
            id.universal_id(),
            version
        ),
    ))
}

fn poisoned<T: TableMetadata>() -> StoreError {
    StoreError::StoreUnavailable {
        message: format!("record lock of '{}' is poisoned", T::table_name()),
        source: None,
    }
}
