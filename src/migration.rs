//! Database migration functionality
//!
//! Creates the table, the `__updated_at__` trigger and the indexes of a model.

use crate::core::AvailIt;
use crate::errors::AvailItError;
use store_object::{GenericRecordStore, TableMetadata};
use type_mapping::quote_identifier;

const TOUCH_FUNCTION_SQL: &str = r#"
CREATE OR REPLACE FUNCTION availit_touch_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.__updated_at__ = NOW();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;
"#;

/// Trigger keeping `__updated_at__` current on every UPDATE of `table_name`
pub fn updated_at_trigger_sql(table_name: &str) -> String {
    let trigger_name = format!("{}_touch_updated_at", table_name);
    format!(
        "DO $$
         BEGIN
             IF NOT EXISTS (SELECT 1 FROM pg_trigger WHERE tgname = '{trigger}') THEN
                 CREATE TRIGGER {quoted_trigger}
                 BEFORE UPDATE ON {table}
                 FOR EACH ROW
                 EXECUTE FUNCTION availit_touch_updated_at();
             END IF;
         END $$",
        trigger = trigger_name,
        quoted_trigger = quote_identifier(&trigger_name),
        table = quote_identifier(table_name),
    )
}

impl AvailIt {
    /// Create the table and indexes for a model.
    /// If recreate is true, drops the existing table first.
    pub async fn auto_migrate<T>(&self, recreate: bool) -> Result<(), AvailItError>
    where
        T: TableMetadata,
    {
        let table_name = T::table_name();

        if recreate {
            let drop_sql = T::drop_table_sql();
            tracing::warn!(table = table_name, "dropping table before migration");
            crate::debug_log!("drop: {}", drop_sql);
            sqlx::query(&drop_sql).execute(self.pool()).await?;
        }

        let create_table_sql = T::create_table_sql();
        crate::debug_log!("create: {}", create_table_sql);
        sqlx::query(&create_table_sql).execute(self.pool()).await?;

        sqlx::query(TOUCH_FUNCTION_SQL).execute(self.pool()).await?;
        sqlx::query(&updated_at_trigger_sql(table_name))
            .execute(self.pool())
            .await?;

        for index_sql in T::create_indexes_sql() {
            crate::trace_log!("index: {}", index_sql);
            sqlx::query(&index_sql).execute(self.pool()).await?;
        }

        tracing::info!(table = table_name, recreate, "table migrated");
        Ok(())
    }

    /// Migrate the store's table, then register the store
    pub async fn register_store_with_migration<S>(
        &mut self,
        name: String,
        store: S,
        recreate: bool,
    ) -> Result<(), AvailItError>
    where
        S: GenericRecordStore + 'static,
    {
        self.auto_migrate::<S::Model>(recreate).await?;
        self.register_store(name, store)
    }
}
