//! `GenericRecordStore` over process memory
//!
//! Ordering follows PostgreSQL (see `type_mapping::compare_values`), so code
//! tested against this store sees the same order the SQL store returns.

use super::core::{check_version, MemoryStore};
use crate::errors::StoreError;
use crate::paging::sort::compare_records;
use crate::paging::{Page, PageRequest, Sort};
use crate::traits::{GenericRecordStore, TableMetadata};
use async_trait::async_trait;

impl<T: TableMetadata> MemoryStore<T> {
    fn sorted(&self, sort: &Sort) -> Result<Vec<T>, StoreError> {
        let orders = sort.resolve::<T>()?;
        // Map order is key order, the same order the SQL store uses when unsorted
        let mut records: Vec<T> = self.read()?.values().cloned().collect();
        if !orders.is_empty() {
            records.sort_by(|a, b| compare_records(a, b, &orders));
        }
        Ok(records)
    }
}

fn unique_sorted<I: Ord + Clone>(ids: &[I]) -> Vec<I> {
    let mut ids = ids.to_vec();
    ids.sort();
    ids.dedup();
    ids
}

#[async_trait]
impl<T> GenericRecordStore for MemoryStore<T>
where
    T: TableMetadata,
{
    type Model = T;
    type Id = T::Id;

    async fn save(&self, record: Self::Model) -> Result<Self::Model, StoreError> {
        let mut records = self.write()?;
        self.save_into(&mut records, record)
    }

    async fn find_by_id(&self, id: &Self::Id) -> Result<Option<Self::Model>, StoreError> {
        Ok(self.read()?.get(id).cloned())
    }

    async fn find_all(&self, sort: &Sort) -> Result<Vec<Self::Model>, StoreError> {
        self.sorted(sort)
    }

    async fn find_page(&self, request: &PageRequest) -> Result<Page<Self::Model>, StoreError> {
        let records = self.sorted(request.sort())?;
        let total = records.len() as i64;
        let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let content = records
            .into_iter()
            .skip(offset)
            .take(request.size() as usize)
            .collect();
        Ok(Page::new(content, request, total))
    }

    async fn delete_by_id(&self, id: &Self::Id) -> Result<bool, StoreError> {
        Ok(self.write()?.remove(id).is_some())
    }

    async fn delete(&self, record: &Self::Model) -> Result<bool, StoreError> {
        let Some(id) = record.id() else {
            return Ok(false);
        };
        let mut records = self.write()?;
        let Some(stored) = records.get(&id) else {
            return Ok(false);
        };
        if let Some(version) = record.version() {
            check_version(stored, &id, version)?;
        }
        Ok(records.remove(&id).is_some())
    }

    async fn count(&self) -> Result<i64, StoreError> {
        Ok(self.read()?.len() as i64)
    }

    async fn exists_by_id(&self, id: &Self::Id) -> Result<bool, StoreError> {
        Ok(self.read()?.contains_key(id))
    }

    async fn save_all(&self, records: Vec<Self::Model>) -> Result<Vec<Self::Model>, StoreError> {
        let mut guard = self.write()?;
        // Work on a copy so a failure leaves the stored records untouched
        let mut staged = guard.clone();
        let saved = records
            .into_iter()
            .map(|record| self.save_into(&mut staged, record))
            .collect::<Result<Vec<_>, _>>()?;
        *guard = staged;
        Ok(saved)
    }

    async fn find_all_by_id(&self, ids: &[Self::Id]) -> Result<Vec<Self::Model>, StoreError> {
        let records = self.read()?;
        Ok(unique_sorted(ids)
            .iter()
            .filter_map(|id| records.get(id).cloned())
            .collect())
    }

    async fn delete_all_by_id(&self, ids: &[Self::Id]) -> Result<Vec<Self::Id>, StoreError> {
        let mut records = self.write()?;
        Ok(unique_sorted(ids)
            .into_iter()
            .filter(|id| records.remove(id).is_some())
            .collect())
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let mut records = self.write()?;
        let removed = records.len() as u64;
        records.clear();
        Ok(removed)
    }
}
