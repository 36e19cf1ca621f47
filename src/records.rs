use polars::prelude::{DataType, Field, Schema};
use serde::{Deserialize, Serialize};

/// A donor as supplied to the predictor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DonorRecord {
    pub blood_group: String,
    pub city: String,
    pub is_available: u8,
    pub months_since_last_donation: u32,
}

impl Default for DonorRecord {
    fn default() -> Self {
        Self {
            blood_group: "A+".to_string(),
            city: "Pune".to_string(),
            is_available: 1,
            months_since_last_donation: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingExample {
    pub blood_group_match: u8,
    pub city_match: u8,
    pub is_available: u8,
    pub months_since_last_donation: u32,
    pub responded_previously: u8,
}

impl TrainingExample {
    pub const fn new(
        blood_group_match: u8,
        city_match: u8,
        is_available: u8,
        months_since_last_donation: u32,
        responded_previously: u8,
    ) -> Self {
        Self {
            blood_group_match,
            city_match,
            is_available,
            months_since_last_donation,
            responded_previously,
        }
    }

    pub fn features(&self) -> [f64; 4] {
        [
            f64::from(self.blood_group_match),
            f64::from(self.city_match),
            f64::from(self.is_available),
            f64::from(self.months_since_last_donation),
        ]
    }

    pub const FEATURE_COLUMNS: [&'static str; 4] = [
        "bloodGroupMatch",
        "cityMatch",
        "isAvailable",
        "monthsSinceLastDonation",
    ];

    pub const TARGET_COLUMN: &'static str = "respondedPreviously";

    pub fn raw_schema() -> Schema {
        Schema::from_iter(vec![
            Field::new("bloodGroupMatch", DataType::Int32),
            Field::new("cityMatch", DataType::Int32),
            Field::new("isAvailable", DataType::Int32),
            Field::new("monthsSinceLastDonation", DataType::Int32),
            Field::new("respondedPreviously", DataType::Int32),
        ])
    }
}
