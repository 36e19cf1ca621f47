//! Feature encoding for donor records.
//!
//! Categorical attributes are looked up in fixed tables. A value missing from
//! its table is carried as [`CategoryCode::Unknown`] so that "not a category we
//! know" stays distinguishable from any real code, and only collapses to `0`
//! when projected onto the numeric vector.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::records::DonorRecord;

lazy_static! {
    static ref BLOOD_GROUP_CODES: HashMap<&'static str, u32> = HashMap::from([
        ("A+", 1),
        ("A-", 2),
        ("B+", 3),
        ("B-", 4),
        ("AB+", 5),
        ("AB-", 6),
        ("O+", 7),
        ("O-", 8),
    ]);
    static ref CITY_CODES: HashMap<&'static str, u32> = HashMap::from([
        ("Mumbai", 1),
        ("Pune", 2),
        ("Delhi", 3),
        ("Chennai", 4),
    ]);
}

/// The eight canonical blood groups, in code order.
pub const BLOOD_GROUPS: [&str; 8] = ["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"];

/// Cities with a dedicated code, in code order. Everything else is "Other".
pub const CITIES: [&str; 4] = ["Mumbai", "Pune", "Delhi", "Chennai"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryCode {
    Known(u32),
    Unknown,
}

impl CategoryCode {
    pub fn as_f64(self) -> f64 {
        match self {
            CategoryCode::Known(code) => code as f64,
            CategoryCode::Unknown => 0.0,
        }
    }

    /// Two codes match only when both are known and equal.
    pub fn matches(self, other: CategoryCode) -> bool {
        matches!((self, other), (CategoryCode::Known(a), CategoryCode::Known(b)) if a == b)
    }

    fn lookup(table: &HashMap<&'static str, u32>, value: &str) -> Self {
        table
            .get(value)
            .map_or(CategoryCode::Unknown, |code| CategoryCode::Known(*code))
    }
}

pub fn encode_blood_group(blood_group: &str) -> CategoryCode {
    CategoryCode::lookup(&BLOOD_GROUP_CODES, blood_group)
}

pub fn encode_city(city: &str) -> CategoryCode {
    CategoryCode::lookup(&CITY_CODES, city)
}

/// Encoded donor: `{blood-group code, city code, availability, months}`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    pub blood_group: CategoryCode,
    pub city: CategoryCode,
    pub is_available: u8,
    pub months_since_last_donation: u32,
}

impl FeatureVector {
    pub fn to_array(&self) -> [f64; 4] {
        [
            self.blood_group.as_f64(),
            self.city.as_f64(),
            f64::from(self.is_available),
            f64::from(self.months_since_last_donation),
        ]
    }
}

pub fn encode(record: &DonorRecord) -> FeatureVector {
    FeatureVector {
        blood_group: encode_blood_group(&record.blood_group),
        city: encode_city(&record.city),
        is_available: record.is_available,
        months_since_last_donation: record.months_since_last_donation,
    }
}

/// The blood group and city a donor is being scored against.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    pub blood_group: String,
    pub city: String,
}

impl RequestContext {
    pub fn new(blood_group: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            blood_group: blood_group.into(),
            city: city.into(),
        }
    }

    /// A request for exactly the donor's own blood group and city.
    pub fn for_record(record: &DonorRecord) -> Self {
        Self::new(record.blood_group.clone(), record.city.clone())
    }
}

/// Cities compare by name, ignoring case and surrounding whitespace, so a city
/// outside the code table still matches itself. An empty name matches nothing.
pub fn same_city(a: &str, b: &str) -> bool {
    let (a, b) = (a.trim(), b.trim());
    !a.is_empty() && a.to_lowercase() == b.to_lowercase()
}

/// Classifier input: `{blood-group match, city match, availability, months}`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchFeatures {
    pub blood_group_match: u8,
    pub city_match: u8,
    pub is_available: u8,
    pub months_since_last_donation: u32,
}

impl MatchFeatures {
    pub fn against(record: &DonorRecord, request: &RequestContext) -> Self {
        let features = encode(record);
        let blood_group_match = features
            .blood_group
            .matches(encode_blood_group(&request.blood_group));
        let city_match = same_city(&record.city, &request.city);
        Self {
            blood_group_match: u8::from(blood_group_match),
            city_match: u8::from(city_match),
            is_available: features.is_available,
            months_since_last_donation: features.months_since_last_donation,
        }
    }

    pub fn to_array(&self) -> [f64; 4] {
        [
            f64::from(self.blood_group_match),
            f64::from(self.city_match),
            f64::from(self.is_available),
            f64::from(self.months_since_last_donation),
        ]
    }
}
