//! Hospital availability walkthrough
//!
//! Runs against the in-memory store, then against PostgreSQL when a
//! configuration can be loaded (`AVAILIT_CONFIG` or `./availit.toml`).

use availit::prelude::*;

async fn walkthrough<S>(label: &str, repository: &S, paging: &PagingConfig) -> anyhow::Result<()>
where
    S: GenericRecordStore<Model = HospitalAvailability, Id = i64>,
{
    println!("== {label} ==");
    repository.delete_all().await?;

    let mut general = HospitalAvailability::new("General Hospital", "1 Main St", "555-0100");
    general.total_beds = 120;
    general.available_beds = 14;
    general.icu_beds = 3;
    general.oxygen_available = true;
    general.locations = Json(vec![Location {
        address: "1 Main St".to_string(),
        city: "Springfield".to_string(),
        state: "IL".to_string(),
        zip_code: "62701".to_string(),
    }]);

    let mut mercy = HospitalAvailability::new("Mercy Clinic", "22 Oak Ave", "555-0142");
    mercy.total_beds = 40;
    mercy.available_beds = 31;

    let mut st_mary = HospitalAvailability::new("St. Mary", "9 Elm St", "555-0199");
    st_mary.total_beds = 75;
    st_mary.available_beds = 0;
    st_mary.ventilators = 6;

    let saved = repository.save_all(vec![general, mercy, st_mary]).await?;
    for record in &saved {
        println!(
            "saved #{:?} {} ({} of {} beds free)",
            record.id, record.hospital_name, record.available_beds, record.total_beds
        );
    }

    // A bed is taken: update through the stored copy
    let mut general = saved[0].clone();
    general.available_beds -= 1;
    let general = repository.save(general).await?;
    println!("updated {} to version {}", general.hospital_name, general.version);

    // Another writer still holding the first copy loses
    match repository.save(saved[0].clone()).await {
        Err(e @ StoreError::Conflict { .. }) => println!("stale write rejected: {e}"),
        other => println!("unexpected result for stale write: {other:?}"),
    }

    let invalid = HospitalAvailability::new("", "nowhere", "none");
    if let Err(e) = repository.save(invalid).await {
        println!("invalid record rejected: {e}");
    }

    let request = PageRequest::from_query(Some(0), Some(2), &["availableBeds,desc"], paging)?;
    let page = repository.find_page(&request).await?;
    println!(
        "page {} of {} ({} records total):",
        page.number + 1,
        page.total_pages,
        page.total_elements
    );
    for record in &page.content {
        println!("  {} - {} beds free", record.hospital_name, record.available_beds);
    }
    println!("{}", serde_json::to_string_pretty(&page.map(|r| r.hospital_name))?);

    let mut stream = repository.stream_all(Sort::parse("hospitalName"), 2);
    while let Some(record) = stream.next().await {
        let record = record?;
        println!("streamed {}", record.hospital_name);
    }

    let removed = repository.delete_by_id(&general.id.unwrap_or_default()).await?;
    println!(
        "deleted General Hospital: {removed}, {} records left",
        repository.count().await?
    );

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let paging = PagingConfig::default();
    walkthrough("memory", &MemoryStore::<HospitalAvailability>::new(), &paging).await?;

    match AppConfig::load() {
        Ok(config) => {
            let availit = AvailIt::from_config(config).await?;
            availit.health_check().await?;
            availit.auto_migrate::<HospitalAvailability>(false).await?;
            let repository: HospitalAvailabilityRepository = availit.store();
            walkthrough("postgres", &repository, availit.paging()).await?;
        }
        Err(e) => println!("skipping PostgreSQL walkthrough: {e}"),
    }

    Ok(())
}
