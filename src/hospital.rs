//! Hospital availability records
//!
//! The one concrete record type of the crate: bed, ICU and ventilator
//! availability of a hospital, as entered through the availability form.

use crate::table_derive::model;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use store_object::PgStore;

/// A site where the hospital operates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

#[model]
#[table(name = "hospital_availability")]
#[serde(rename_all = "camelCase")]
pub struct HospitalAvailability {
    #[primary_key]
    #[serde(default)]
    pub id: Option<i64>,

    #[field(required, index)]
    pub hospital_name: String,

    #[field(non_negative)]
    pub total_beds: i32,

    #[field(non_negative)]
    pub available_beds: i32,

    #[field(non_negative)]
    pub icu_beds: i32,

    #[field(non_negative)]
    pub ventilators: i32,

    pub oxygen_available: bool,

    #[field(required)]
    pub address: String,

    #[field(required)]
    pub contact_number: String,

    #[serde(default)]
    pub locations: Json<Vec<Location>>,

    #[version]
    #[serde(default)]
    pub version: i64,
}

impl HospitalAvailability {
    /// A record not yet stored, with no beds or equipment reported
    pub fn new(
        hospital_name: impl Into<String>,
        address: impl Into<String>,
        contact_number: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            hospital_name: hospital_name.into(),
            total_beds: 0,
            available_beds: 0,
            icu_beds: 0,
            ventilators: 0,
            oxygen_available: false,
            address: address.into(),
            contact_number: contact_number.into(),
            locations: Json(Vec::new()),
            version: 0,
        }
    }
}

/// Repository for hospital availability records
pub type HospitalAvailabilityRepository = PgStore<HospitalAvailability>;
