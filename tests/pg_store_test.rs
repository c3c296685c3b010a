//! Integration tests for the PostgreSQL record store
//!
//! These tests need a database: they run when `DATABASE_URL` is set and
//! return early otherwise. Tests recreate their tables, so they run one at a time.

use availit::prelude::*;
use std::sync::OnceLock;
use tokio::sync::{Mutex, MutexGuard};

#[model]
#[table(name = "pg_wards")]
pub struct PgWard {
    #[primary_key]
    pub id: Option<i64>,

    #[field(required, index)]
    pub name: String,

    #[field(non_negative)]
    pub beds: i32,

    pub floor: Option<i32>,

    #[version]
    pub version: i64,
}

#[model]
#[table(name = "pg_sorted_wards")]
pub struct SortedWard {
    #[primary_key]
    pub id: Option<i64>,

    pub name: String,

    pub beds: i32,

    pub floor: Option<i32>,
}

#[model]
#[table(name = "pg_departments")]
pub struct Department {
    #[primary_key]
    pub id: Option<Uuid>,

    #[field(required, unique)]
    pub code: String,
}

fn database_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

/// Fresh table for `T`, or `None` when no database is configured.
/// The guard keeps other tests off the database until it is dropped.
async fn setup<T: TableMetadata>() -> Option<(AvailIt, MutexGuard<'static, ()>)> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping {}", T::table_name());
        return None;
    };

    let guard = database_lock().lock().await;
    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to database");
    let availit = AvailIt::with_pool(pool, PagingConfig::default());

    availit
        .auto_migrate::<T>(true)
        .await
        .expect("Failed to migrate table");
    Some((availit, guard))
}

fn pg_ward(name: &str, beds: i32) -> PgWard {
    PgWard {
        id: None,
        name: name.to_string(),
        beds,
        floor: None,
        version: 0,
    }
}

#[tokio::test]
async fn test_save_find_delete_scenario() {
    let Some((availit, _guard)) = setup::<PgWard>().await else {
        return;
    };
    let store = availit.store::<PgWard>();

    let saved = store.save(pg_ward("Ward A", 5)).await.unwrap();
    assert_eq!(saved.id, Some(1));
    assert_eq!(saved.version, 0);

    assert_eq!(store.find_by_id(&1).await.unwrap(), Some(saved));
    assert!(store.delete_by_id(&1).await.unwrap());
    assert_eq!(store.find_by_id(&1).await.unwrap(), None);
    assert!(!store.delete_by_id(&1).await.unwrap());
    assert_eq!(store.count().await.unwrap(), 0);

    // The key sequence is never reused
    let next = store.save(pg_ward("Ward B", 2)).await.unwrap();
    assert_eq!(next.id, Some(2));
}

#[tokio::test]
async fn test_updates_versions_and_conflicts() {
    let Some((availit, _guard)) = setup::<PgWard>().await else {
        return;
    };
    let store = availit.store::<PgWard>();

    let created = store.save(pg_ward("ICU", 4)).await.unwrap();
    let mut edit = created.clone();
    edit.beds = 6;
    let updated = store.save(edit).await.unwrap();
    assert_eq!(updated.version, 1);
    assert_eq!(updated.beds, 6);

    let err = store.save(created.clone()).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict { .. }));

    let mut ghost = pg_ward("Ghost", 1);
    ghost.id = Some(9_999);
    assert!(matches!(
        store.save(ghost).await,
        Err(StoreError::NotFound { .. })
    ));

    assert!(matches!(
        store.delete(&created).await,
        Err(StoreError::Conflict { .. })
    ));
    assert!(store.delete(&updated).await.unwrap());
    assert!(!store.delete(&updated).await.unwrap());
}

#[tokio::test]
async fn test_validation_writes_nothing() {
    let Some((availit, _guard)) = setup::<PgWard>().await else {
        return;
    };
    let store = availit.store::<PgWard>();

    assert!(matches!(
        store.save(pg_ward("", 1)).await,
        Err(StoreError::Validation { .. })
    ));
    assert!(matches!(
        store.save_all(vec![pg_ward("Ward A", 1), pg_ward("Ward B", -1)]).await,
        Err(StoreError::Validation { .. })
    ));
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_ordering_matches_memory_store() {
    let Some((availit, _guard)) = setup::<SortedWard>().await else {
        return;
    };
    let pg = availit.store::<SortedWard>();
    let memory = MemoryStore::<SortedWard>::new();

    for (name, beds, floor) in [
        ("Ward C", 12, Some(2)),
        ("Ward A", 5, None),
        ("Ward E", 30, Some(1)),
        ("Ward B", 5, Some(3)),
        ("Ward D", 8, None),
    ] {
        let record = SortedWard {
            id: None,
            name: name.to_string(),
            beds,
            floor,
        };
        pg.save(record.clone()).await.unwrap();
        memory.save(record).await.unwrap();
    }

    for sort in [
        Sort::unsorted(),
        Sort::asc("floor"),
        Sort::desc("floor"),
        Sort::parse("beds,desc").and("floor", Direction::Asc),
    ] {
        assert_eq!(
            pg.find_all(&sort).await.unwrap(),
            memory.find_all(&sort).await.unwrap(),
            "order differs for {sort:?}"
        );
    }

    let request = PageRequest::new(1, 2, Sort::asc("beds")).unwrap();
    assert_eq!(
        pg.find_page(&request).await.unwrap(),
        memory.find_page(&request).await.unwrap()
    );
}

#[tokio::test]
async fn test_stream_and_bulk_operations() {
    let Some((availit, _guard)) = setup::<PgWard>().await else {
        return;
    };
    let store = availit.store::<PgWard>();

    let saved = store
        .save_all((1..=7).map(|i| pg_ward(&format!("Ward {i}"), i)).collect())
        .await
        .unwrap();
    let ids: Vec<i64> = saved.iter().filter_map(|w| w.id).collect();

    let streamed: Vec<PgWard> = store
        .stream_all(Sort::desc("beds"), 3)
        .map(|r| r.unwrap())
        .collect()
        .await;
    assert_eq!(streamed.len(), 7);
    assert_eq!(streamed[0].beds, 7);

    let found = store.find_all_by_id(&[ids[2], ids[0]]).await.unwrap();
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].id, Some(ids[0]));

    let removed = store.delete_all_by_id(&[ids[1], ids[5], -1]).await.unwrap();
    assert_eq!(removed, vec![ids[1], ids[5]]);
    assert!(!store.exists_by_id(&ids[1]).await.unwrap());

    assert_eq!(store.delete_all().await.unwrap(), 5);
}

#[tokio::test]
async fn test_unique_violation_is_duplicate() {
    let Some((availit, _guard)) = setup::<Department>().await else {
        return;
    };
    let store = availit.store::<Department>();

    let first = store
        .save(Department {
            id: None,
            code: "ER".to_string(),
        })
        .await
        .unwrap();
    assert!(first.id.is_some());

    let err = store
        .save(Department {
            id: None,
            code: "ER".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Duplicate { ref message, .. } if message.contains("23505")));
    // A retry would hit the same constraint
    assert!(!err.is_transient());
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_hospital_repository_round_trip() {
    let Some((availit, _guard)) = setup::<HospitalAvailability>().await else {
        return;
    };
    let repository: HospitalAvailabilityRepository = availit.store();

    let mut record = HospitalAvailability::new("General", "1 Main St", "555-0100");
    record.total_beds = 120;
    record.available_beds = 14;
    record.oxygen_available = true;
    record.locations = Json(vec![Location {
        address: "1 Main St".to_string(),
        city: "Springfield".to_string(),
        state: "IL".to_string(),
        zip_code: "62701".to_string(),
    }]);

    let saved = repository.save(record).await.unwrap();
    let id = saved.id.unwrap();
    assert_eq!(repository.find_by_id(&id).await.unwrap(), Some(saved.clone()));

    let page = repository
        .find_page(
            &PageRequest::from_query(
                None,
                None,
                &["hospitalName,asc"],
                availit.paging(),
            )
            .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(page.total_elements, 1);
    assert_eq!(page.content[0].locations.0[0].city, "Springfield");

    let created_at: chrono::DateTime<chrono::Utc> = sqlx::query_scalar(
        "SELECT \"__updated_at__\" FROM \"hospital_availability\" WHERE \"id\" = $1",
    )
    .bind(id)
    .fetch_one(availit.pool())
    .await
    .unwrap();

    // NOW() is the transaction start time, so leave a gap between the two writes
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let mut edit = saved;
    edit.available_beds = 10;
    repository.save(edit).await.unwrap();

    let updated_at: chrono::DateTime<chrono::Utc> = sqlx::query_scalar(
        "SELECT \"__updated_at__\" FROM \"hospital_availability\" WHERE \"id\" = $1",
    )
    .bind(id)
    .fetch_one(availit.pool())
    .await
    .unwrap();
    assert!(updated_at > created_at);
}
