use std::cmp::Ordering;
use std::path::Path;

use chrono::NaiveDate;
use log::{debug, info};
use serde::Deserialize;

use crate::error::Result;

pub const DEFAULT_LIMIT: usize = 3;
pub static DEFAULT_STATE: &str = "Maharashtra";

/// One row of a donor roster CSV.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterDonor {
    pub full_name: String,
    pub phone: String,
    pub blood_group: String,
    pub city: String,
    pub state: String,
    pub is_available: u8,
    pub donation_count: u32,
    pub last_donation_date: Option<NaiveDate>,
}

/// What a hospital is asking for. A `limit` of 0 means no limit.
#[derive(Debug, Clone, PartialEq)]
pub struct DonorQuery {
    pub blood_group: String,
    pub city: String,
    pub state: String,
    pub limit: usize,
}

impl DonorQuery {
    /// Blank states fall back to [`DEFAULT_STATE`].
    pub fn new(blood_group: &str, city: &str, state: &str, limit: usize) -> Self {
        let state = match state.trim() {
            "" => DEFAULT_STATE,
            state => state,
        };
        Self {
            blood_group: blood_group.trim().to_string(),
            city: city.trim().to_string(),
            state: state.to_string(),
            limit,
        }
    }

    fn accepts(&self, donor: &RosterDonor) -> bool {
        donor.blood_group == self.blood_group
            && donor.is_available == 1
            && (contains_ignore_case(&donor.city, &self.city)
                || contains_ignore_case(&donor.state, &self.state))
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    !needle.is_empty() && haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Most donations first, then longest since last donation. A donor with no
/// recorded date sorts ahead of any dated donor.
fn by_priority(a: &RosterDonor, b: &RosterDonor) -> Ordering {
    b.donation_count
        .cmp(&a.donation_count)
        .then_with(|| a.last_donation_date.cmp(&b.last_donation_date))
        .then_with(|| a.full_name.cmp(&b.full_name))
}

pub fn read_roster<P: AsRef<Path>>(path: P) -> Result<Vec<RosterDonor>> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let mut donors = Vec::new();
    for row in reader.deserialize() {
        let donor: RosterDonor = row?;
        donors.push(donor);
    }
    debug!("Read {} donors from {:?}", donors.len(), path.as_ref());
    Ok(donors)
}

pub fn recommend(roster: &[RosterDonor], query: &DonorQuery) -> Vec<RosterDonor> {
    let mut eligible: Vec<RosterDonor> = roster
        .iter()
        .filter(|donor| query.accepts(donor))
        .cloned()
        .collect();
    eligible.sort_by(by_priority);
    if query.limit > 0 {
        eligible.truncate(query.limit);
    }
    info!(
        "{} of {} donors recommended for {} in {}/{}",
        eligible.len(),
        roster.len(),
        query.blood_group,
        query.city,
        query.state
    );
    eligible
}
