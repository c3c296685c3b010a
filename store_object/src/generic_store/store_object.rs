//! Generic store implementations
//!
//! `GenericRecordStore` over PostgreSQL, using the statements derived for `T`.

use super::core::PgStore;
use crate::errors::StoreError;
use crate::paging::{Page, PageRequest, Sort};
use crate::traits::{GenericRecordStore, TableMetadata};
use async_trait::async_trait;
use sqlx::Row;

#[async_trait]
impl<T> GenericRecordStore for PgStore<T>
where
    T: TableMetadata,
{
    type Model = T;
    type Id = T::Id;

    async fn save(&self, record: Self::Model) -> Result<Self::Model, StoreError> {
        let mut conn = self.acquire("save").await?;
        Self::save_with(&mut conn, record).await
    }

    async fn find_by_id(&self, id: &Self::Id) -> Result<Option<Self::Model>, StoreError> {
        sqlx::query_as::<_, T>(T::get_by_id_sql())
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await
            .map_err(|e| StoreError::database_operation(T::table_name(), "find_by_id", e))
    }

    async fn find_all(&self, sort: &Sort) -> Result<Vec<Self::Model>, StoreError> {
        let sql = format!("{} {}", T::select_base_sql(), sort.order_by_sql::<T>()?);
        crate::debug_log!("[{}] find_all: {}", T::table_name(), sql);

        sqlx::query_as::<_, T>(&sql)
            .fetch_all(&self.db_pool)
            .await
            .map_err(|e| StoreError::database_operation(T::table_name(), "find_all", e))
    }

    async fn find_page(&self, request: &PageRequest) -> Result<Page<Self::Model>, StoreError> {
        let sql = format!(
            "{} {} LIMIT $1 OFFSET $2",
            T::select_base_sql(),
            request.sort().order_by_sql::<T>()?
        );
        crate::debug_log!(
            "[{}] find_page {} (size {}): {}",
            T::table_name(),
            request.page(),
            request.size(),
            sql
        );

        let offset = i64::try_from(request.offset()).map_err(|_| {
            StoreError::InvalidPageRequest(format!("page {} is out of range", request.page()))
        })?;

        let total = self.count().await?;
        let content = sqlx::query_as::<_, T>(&sql)
            .bind(i64::from(request.size()))
            .bind(offset)
            .fetch_all(&self.db_pool)
            .await
            .map_err(|e| StoreError::database_operation(T::table_name(), "find_page", e))?;

        Ok(Page::new(content, request, total))
    }

    async fn delete_by_id(&self, id: &Self::Id) -> Result<bool, StoreError> {
        let result = sqlx::query(T::delete_by_id_sql())
            .bind(id)
            .execute(&self.db_pool)
            .await
            .map_err(|e| StoreError::database_operation(T::table_name(), "delete_by_id", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, record: &Self::Model) -> Result<bool, StoreError> {
        let Some(id) = record.id() else {
            return Ok(false);
        };
        let Some(version) = record.version() else {
            return self.delete_by_id(&id).await;
        };

        let mut conn = self.acquire("delete").await?;
        let result = sqlx::query(T::delete_entity_sql())
            .bind(&id)
            .bind(version)
            .execute(&mut *conn)
            .await
            .map_err(|e| StoreError::database_operation(T::table_name(), "delete", e))?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }
        match Self::missed_write(&mut conn, record, &id).await? {
            StoreError::NotFound { .. } => Ok(false),
            conflict => Err(conflict),
        }
    }

    async fn count(&self) -> Result<i64, StoreError> {
        let row = sqlx::query(T::count_all_sql())
            .fetch_one(&self.db_pool)
            .await
            .map_err(|e| StoreError::database_operation(T::table_name(), "count", e))?;

        row.try_get::<i64, _>("total")
            .map_err(|e| StoreError::database_operation(T::table_name(), "count", e))
    }

    async fn exists_by_id(&self, id: &Self::Id) -> Result<bool, StoreError> {
        let mut conn = self.acquire("exists_by_id").await?;
        Self::exists_with(&mut conn, id).await
    }

    async fn save_all(&self, records: Vec<Self::Model>) -> Result<Vec<Self::Model>, StoreError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        // All or nothing: an error drops the transaction, which rolls it back
        let mut tx = self
            .db_pool
            .begin()
            .await
            .map_err(|e| StoreError::database_operation(T::table_name(), "save_all", e))?;

        let mut saved = Vec::with_capacity(records.len());
        for record in records {
            saved.push(Self::save_with(&mut tx, record).await?);
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::database_operation(T::table_name(), "save_all", e))?;

        tracing::debug!(table = T::table_name(), count = saved.len(), "saved batch");
        Ok(saved)
    }

    async fn find_all_by_id(&self, ids: &[Self::Id]) -> Result<Vec<Self::Model>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, T>(T::find_all_by_id_sql())
            .bind(ids.to_vec())
            .fetch_all(&self.db_pool)
            .await
            .map_err(|e| StoreError::database_operation(T::table_name(), "find_all_by_id", e))
    }

    async fn delete_all_by_id(&self, ids: &[Self::Id]) -> Result<Vec<Self::Id>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut deleted = sqlx::query_scalar::<_, T::Id>(T::delete_all_by_id_sql())
            .bind(ids.to_vec())
            .fetch_all(&self.db_pool)
            .await
            .map_err(|e| StoreError::database_operation(T::table_name(), "delete_all_by_id", e))?;

        deleted.sort();
        Ok(deleted)
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let result = sqlx::query(T::delete_all_sql())
            .execute(&self.db_pool)
            .await
            .map_err(|e| StoreError::database_operation(T::table_name(), "delete_all", e))?;

        tracing::debug!(
            table = T::table_name(),
            removed = result.rows_affected(),
            "deleted all records"
        );
        Ok(result.rows_affected())
    }
}
