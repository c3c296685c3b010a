use crate::errors::StoreError;
use crate::id_type::HasUniversalId;
use crate::traits::TableMetadata;
use crate::DbPool;
use sqlx::pool::PoolConnection;
use sqlx::{PgConnection, Postgres};

/// PostgreSQL-backed record store
///
/// Holds no state besides the pool; PostgreSQL serialises concurrent writers.
#[derive(Clone)]
pub struct PgStore<T: TableMetadata> {
    pub(crate) db_pool: DbPool,
    pub(crate) _phantom: std::marker::PhantomData<T>,
}

impl<T: TableMetadata> std::fmt::Debug for PgStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgStore")
            .field("table", &T::table_name())
            .field("pool_size", &self.db_pool.size())
            .finish()
    }
}

impl<T: TableMetadata> PgStore<T> {
    pub fn new(db_pool: DbPool) -> Self {
        Self {
            db_pool,
            _phantom: std::marker::PhantomData,
        }
    }

    pub fn pool(&self) -> &DbPool {
        &self.db_pool
    }

    /// Validate, then insert or update depending on whether the record has an id
    pub(crate) async fn save_with(conn: &mut PgConnection, record: T) -> Result<T, StoreError> {
        record
            .validate()
            .map_err(|e| StoreError::validation(T::table_name(), e))?;

        match record.id() {
            None => Self::insert_with(conn, &record).await,
            Some(id) => Self::update_with(conn, &record, &id).await,
        }
    }

    async fn insert_with(conn: &mut PgConnection, record: &T) -> Result<T, StoreError> {
        crate::debug_log!("[{}] insert: {}", T::table_name(), T::insert_sql());
        record
            .bind_insert(sqlx::query_as::<_, T>(T::insert_sql()))
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| StoreError::database_operation(T::table_name(), "insert", e))
    }

    async fn update_with(
        conn: &mut PgConnection,
        record: &T,
        id: &T::Id,
    ) -> Result<T, StoreError> {
        crate::debug_log!("[{}] update: {}", T::table_name(), T::update_sql());
        let updated = record
            .bind_update(sqlx::query_as::<_, T>(T::update_sql()))
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| StoreError::database_operation(T::table_name(), "update", e))?;

        match updated {
            Some(updated) => Ok(updated),
            None => Err(Self::missed_write(conn, record, id).await?),
        }
    }

    /// Explain why a keyed write matched no row: the row is gone, or its
    /// version moved on
    pub(crate) async fn missed_write(
        conn: &mut PgConnection,
        record: &T,
        id: &T::Id,
    ) -> Result<StoreError, StoreError> {
        if Self::exists_with(conn, id).await? {
            let version = record.version().unwrap_or_default();
            tracing::warn!(
                table = T::table_name(),
                id = %id.universal_id(),
                version,
                "stale version rejected"
            );
            Ok(StoreError::conflict(
                T::table_name(),
                format!(
                    "record {} was modified concurrently (version {} is stale)",
                    id.universal_id(),
                    version
                ),
            ))
        } else {
            Ok(StoreError::not_found(T::table_name(), id.universal_id()))
        }
    }

    pub(crate) async fn exists_with(
        conn: &mut PgConnection,
        id: &T::Id,
    ) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>(T::exists_by_id_sql())
            .bind(id)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| StoreError::database_operation(T::table_name(), "exists_by_id", e))
    }

    pub(crate) async fn acquire(
        &self,
        operation: &str,
    ) -> Result<PoolConnection<Postgres>, StoreError> {
        self.db_pool
            .acquire()
            .await
            .map_err(|e| StoreError::database_operation(T::table_name(), operation, e))
    }
}
