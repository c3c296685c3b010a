//! Trait definitions
//!
//! This module defines the storage contract shared by every adapter.

use crate::errors::StoreError;
use crate::paging::{Page, PageRequest, Sort};
use crate::traits::TableMetadata;
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use std::collections::VecDeque;
use std::fmt::Debug;

/// Lazy sequence of records fetched batch by batch
pub type RecordStream<'a, T> = BoxStream<'a, Result<T, StoreError>>;

/// Create, read, update and delete operations for one record type
///
/// Mutations are persisted before the call returns. Nothing is cached between
/// calls, so every read observes the backing medium.
#[async_trait]
pub trait GenericRecordStore: Send + Sync {
    /// The record type this store holds
    type Model: TableMetadata<Id = Self::Id>;

    /// The record identifier
    type Id: Clone + Send + Sync + Debug;

    /// Insert a record without an identifier, or update the record whose
    /// identifier it carries. Returns the stored record.
    ///
    /// Updating an identifier that is not stored fails with `NotFound`; a
    /// stale version fails with `Conflict`. A value clashing with a unique
    /// column fails with `Duplicate` where the backing store enforces it.
    async fn save(&self, record: Self::Model) -> Result<Self::Model, StoreError>;

    async fn find_by_id(&self, id: &Self::Id) -> Result<Option<Self::Model>, StoreError>;

    /// Every record, in `sort` order. An unsorted request has no guaranteed order.
    async fn find_all(&self, sort: &Sort) -> Result<Vec<Self::Model>, StoreError>;

    /// One page of the sorted records plus totals
    async fn find_page(&self, request: &PageRequest) -> Result<Page<Self::Model>, StoreError>;

    /// Remove a record by identifier. Returns `false` when nothing was stored under it.
    async fn delete_by_id(&self, id: &Self::Id) -> Result<bool, StoreError>;

    /// Remove the stored counterpart of `record`. A record without an
    /// identifier is a no-op; a stale version fails with `Conflict`.
    async fn delete(&self, record: &Self::Model) -> Result<bool, StoreError>;

    async fn count(&self) -> Result<i64, StoreError>;

    async fn exists_by_id(&self, id: &Self::Id) -> Result<bool, StoreError>;

    /// Save every record, in order
    async fn save_all(&self, records: Vec<Self::Model>) -> Result<Vec<Self::Model>, StoreError>;

    /// Stored records among `ids`, ordered by identifier; missing ids are skipped
    async fn find_all_by_id(&self, ids: &[Self::Id]) -> Result<Vec<Self::Model>, StoreError>;

    /// Remove every record among `ids`, returning the identifiers actually removed
    async fn delete_all_by_id(&self, ids: &[Self::Id]) -> Result<Vec<Self::Id>, StoreError>;

    /// Remove every record, returning how many were removed
    async fn delete_all(&self) -> Result<u64, StoreError>;

    /// Stream every record in `sort` order, fetching `batch_size` records per
    /// page. Each call starts again from the first record.
    fn stream_all(&self, sort: Sort, batch_size: u32) -> RecordStream<'_, Self::Model> {
        let first = match PageRequest::new(0, batch_size, sort) {
            Ok(request) => request,
            Err(e) => return stream::once(async move { Err(e) }).boxed(),
        };

        let cursor = StreamCursor {
            next_page: Some(first),
            buffered: VecDeque::new(),
        };

        stream::unfold(cursor, move |mut cursor| async move {
            loop {
                if let Some(record) = cursor.buffered.pop_front() {
                    return Some((Ok(record), cursor));
                }
                let request = cursor.next_page.take()?;
                match self.find_page(&request).await {
                    Ok(page) => {
                        if page.is_empty() {
                            return None;
                        }
                        if page.has_next() {
                            cursor.next_page = Some(request.next());
                        }
                        cursor.buffered.extend(page.content);
                    }
                    // No next page is queued, so the stream ends after the error
                    Err(e) => return Some((Err(e), cursor)),
                }
            }
        })
        .boxed()
    }
}

struct StreamCursor<T> {
    next_page: Option<PageRequest>,
    buffered: VecDeque<T>,
}
