//! Integration tests for the in-memory record store
//!
//! Exercises the full `GenericRecordStore` contract without a database.

use availit::prelude::*;
use std::collections::HashSet;

#[model]
#[table(name = "wards")]
pub struct Ward {
    #[primary_key]
    pub id: Option<i64>,

    #[field(required)]
    pub name: String,

    #[field(non_negative)]
    pub beds: i32,

    pub floor: Option<i32>,
}

#[model]
#[table(name = "versioned_wards")]
pub struct VersionedWard {
    #[primary_key]
    pub id: Option<i32>,

    #[field(required)]
    pub name: String,

    #[version]
    pub version: i64,
}

#[model]
#[table(name = "badges")]
pub struct Badge {
    #[primary_key]
    pub id: Option<Uuid>,

    pub holder: String,
}

fn ward(name: &str, beds: i32) -> Ward {
    Ward {
        id: None,
        name: name.to_string(),
        beds,
        floor: None,
    }
}

fn on_floor(mut ward: Ward, floor: i32) -> Ward {
    ward.floor = Some(floor);
    ward
}

async fn seeded(store: &MemoryStore<Ward>) -> Vec<Ward> {
    let mut saved = Vec::new();
    for w in [
        on_floor(ward("Ward C", 12), 2),
        ward("Ward A", 5),
        on_floor(ward("Ward E", 30), 1),
        on_floor(ward("Ward B", 5), 3),
        ward("Ward D", 8),
    ] {
        saved.push(store.save(w).await.unwrap());
    }
    saved
}

fn names(wards: &[Ward]) -> Vec<&str> {
    wards.iter().map(|w| w.name.as_str()).collect()
}

#[tokio::test]
async fn test_save_find_delete_scenario() {
    let store = MemoryStore::<Ward>::new();

    let saved = store.save(ward("Ward A", 5)).await.unwrap();
    assert_eq!(saved.id, Some(1));
    assert_eq!(saved.name, "Ward A");
    assert_eq!(saved.beds, 5);

    assert_eq!(store.find_by_id(&1).await.unwrap(), Some(saved));
    assert!(store.delete_by_id(&1).await.unwrap());
    assert_eq!(store.find_by_id(&1).await.unwrap(), None);
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_count_and_find_all_track_survivors() {
    let store = MemoryStore::<Ward>::new();
    let saved = seeded(&store).await;
    assert_eq!(store.count().await.unwrap(), 5);

    store.delete_by_id(&saved[1].id.unwrap()).await.unwrap();
    store.delete(&saved[3]).await.unwrap();

    let all = store.find_all(&Sort::unsorted()).await.unwrap();
    assert_eq!(all.len() as i64, store.count().await.unwrap());
    let expected: HashSet<_> = [&saved[0], &saved[2], &saved[4]]
        .iter()
        .map(|w| w.id)
        .collect();
    let actual: HashSet<_> = all.iter().map(|w| w.id).collect();
    assert_eq!(actual, expected);
}

#[tokio::test]
async fn test_find_by_id_is_idempotent() {
    let store = MemoryStore::<Ward>::new();
    let saved = store.save(ward("Ward A", 5)).await.unwrap();
    let id = saved.id.unwrap();

    let first = store.find_by_id(&id).await.unwrap();
    let second = store.find_by_id(&id).await.unwrap();
    assert_eq!(first, second);
    assert!(store.exists_by_id(&id).await.unwrap());
    assert!(!store.exists_by_id(&(id + 1)).await.unwrap());
}

#[tokio::test]
async fn test_update_replaces_stored_record() {
    let store = MemoryStore::<Ward>::new();
    let mut saved = store.save(ward("Ward A", 5)).await.unwrap();

    saved.beds = 9;
    let updated = store.save(saved.clone()).await.unwrap();
    assert_eq!(updated, saved);
    assert_eq!(store.find_by_id(&saved.id.unwrap()).await.unwrap(), Some(saved));
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_update_of_missing_id_is_not_found() {
    let store = MemoryStore::<Ward>::new();
    let mut ghost = ward("Ward Z", 1);
    ghost.id = Some(42);

    let err = store.save(ghost).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { ref id, .. } if id == "42"));
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_deleting_absent_records_is_a_no_op() {
    let store = MemoryStore::<Ward>::new();
    store.save(ward("Ward A", 5)).await.unwrap();

    assert!(!store.delete_by_id(&99).await.unwrap());
    assert!(!store.delete(&ward("never saved", 1)).await.unwrap());
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_validation_rejects_writes() {
    let store = MemoryStore::<Ward>::new();

    let err = store.save(ward("  ", 5)).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation {
            source: ValidationError::Required { .. },
            ..
        }
    ));

    let err = store.save(ward("Ward A", -2)).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation {
            source: ValidationError::Negative { .. },
            ..
        }
    ));
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_optimistic_versioning() {
    let store = MemoryStore::<VersionedWard>::new();
    let created = store
        .save(VersionedWard {
            id: None,
            name: "ICU".to_string(),
            version: 7,
        })
        .await
        .unwrap();
    assert_eq!(created.version, 0);

    let mut edit = created.clone();
    edit.name = "ICU North".to_string();
    let updated = store.save(edit).await.unwrap();
    assert_eq!(updated.version, 1);

    // A second writer still holding version 0
    let mut stale = created.clone();
    stale.name = "ICU South".to_string();
    let err = store.save(stale).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict { .. }));
    assert!(err.is_transient());

    assert!(matches!(
        store.delete(&created).await,
        Err(StoreError::Conflict { .. })
    ));
    assert!(store.delete(&updated).await.unwrap());
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_sorting_follows_postgres_order() {
    let store = MemoryStore::<Ward>::new();
    seeded(&store).await;

    let by_beds = store
        .find_all(&Sort::parse("beds,desc").and("name", Direction::Asc))
        .await
        .unwrap();
    assert_eq!(
        names(&by_beds),
        vec!["Ward E", "Ward C", "Ward D", "Ward A", "Ward B"]
    );

    // NULLs last ascending, first descending
    let floor_asc = store.find_all(&Sort::asc("floor")).await.unwrap();
    assert_eq!(
        names(&floor_asc),
        vec!["Ward E", "Ward C", "Ward B", "Ward A", "Ward D"]
    );
    let floor_desc = store.find_all(&Sort::desc("floor")).await.unwrap();
    assert_eq!(
        names(&floor_desc),
        vec!["Ward A", "Ward D", "Ward B", "Ward C", "Ward E"]
    );

    let err = store.find_all(&Sort::asc("nurses")).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation {
            source: ValidationError::UnknownProperty { .. },
            ..
        }
    ));
}

#[tokio::test]
async fn test_paging() {
    let store = MemoryStore::<Ward>::new();
    seeded(&store).await;

    let request = PageRequest::new(0, 2, Sort::asc("name")).unwrap();
    let first = store.find_page(&request).await.unwrap();
    assert_eq!(names(&first.content), vec!["Ward A", "Ward B"]);
    assert_eq!(first.total_elements, 5);
    assert_eq!(first.total_pages, 3);
    assert!(first.is_first());
    assert!(first.has_next());

    let last = store.find_page(&request.next().next()).await.unwrap();
    assert_eq!(names(&last.content), vec!["Ward E"]);
    assert!(last.is_last());

    let beyond = store
        .find_page(&PageRequest::new(7, 2, Sort::asc("name")).unwrap())
        .await
        .unwrap();
    assert!(beyond.is_empty());
    assert_eq!(beyond.total_elements, 5);
}

#[tokio::test]
async fn test_stream_all_is_restartable() {
    let store = MemoryStore::<Ward>::new();
    seeded(&store).await;

    let first: Vec<Ward> = store
        .stream_all(Sort::asc("name"), 2)
        .map(|r| r.unwrap())
        .collect()
        .await;
    assert_eq!(
        names(&first),
        vec!["Ward A", "Ward B", "Ward C", "Ward D", "Ward E"]
    );

    let again: Vec<Ward> = store
        .stream_all(Sort::asc("name"), 3)
        .map(|r| r.unwrap())
        .collect()
        .await;
    assert_eq!(again, first);

    let empty = MemoryStore::<Ward>::new();
    assert_eq!(empty.stream_all(Sort::unsorted(), 2).count().await, 0);

    let invalid: Vec<_> = store.stream_all(Sort::unsorted(), 0).collect().await;
    assert_eq!(invalid.len(), 1);
    assert!(matches!(invalid[0], Err(StoreError::InvalidPageRequest(_))));
}

#[tokio::test]
async fn test_save_all_is_atomic() {
    let store = MemoryStore::<Ward>::new();

    let err = store
        .save_all(vec![ward("Ward A", 1), ward("", 2)])
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation { .. }));
    assert_eq!(store.count().await.unwrap(), 0);

    let saved = store
        .save_all(vec![ward("Ward A", 1), ward("Ward B", 2)])
        .await
        .unwrap();
    assert_eq!(saved.len(), 2);
    assert!(saved.iter().all(|w| w.id.is_some()));
    assert_eq!(store.count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_bulk_lookups_and_deletes() {
    let store = MemoryStore::<Ward>::new();
    let saved = seeded(&store).await;
    let ids: Vec<i64> = saved.iter().filter_map(|w| w.id).collect();

    let found = store
        .find_all_by_id(&[ids[3], ids[0], 999, ids[3]])
        .await
        .unwrap();
    assert_eq!(names(&found), vec!["Ward C", "Ward B"]);

    let removed = store
        .delete_all_by_id(&[ids[4], ids[1], 999])
        .await
        .unwrap();
    assert_eq!(removed, vec![ids[1], ids[4]]);
    assert_eq!(store.count().await.unwrap(), 3);

    assert_eq!(store.delete_all().await.unwrap(), 3);
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_concurrent_saves_assign_unique_ids() {
    let store = MemoryStore::<Ward>::new();

    let handles: Vec<_> = (0..50)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move { store.save(ward(&format!("Ward {i}"), i)).await })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        let saved = handle.await.unwrap().unwrap();
        ids.insert(saved.id.unwrap());
    }

    assert_eq!(ids.len(), 50);
    assert_eq!(ids, (1..=50).collect::<HashSet<i64>>());
    assert_eq!(store.count().await.unwrap(), 50);
}

#[tokio::test]
async fn test_uuid_keys_are_generated() {
    let store = MemoryStore::<Badge>::new();
    let a = store
        .save(Badge {
            id: None,
            holder: "Dr. Reyes".to_string(),
        })
        .await
        .unwrap();
    let b = store
        .save(Badge {
            id: None,
            holder: "Dr. Osei".to_string(),
        })
        .await
        .unwrap();

    assert!(a.id.is_some());
    assert_ne!(a.id, b.id);
    assert_eq!(store.find_by_id(&a.id.unwrap()).await.unwrap(), Some(a));
}
