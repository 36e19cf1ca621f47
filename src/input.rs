//! Parsing of the predictor's single command-line argument.
//!
//! Input starting with `{` is structured and must be a valid JSON donor
//! record. Anything else is the `bloodGroup,city,months` shorthand.

use log::debug;

use crate::encoder::{encode_blood_group, CategoryCode, BLOOD_GROUPS};
use crate::error::{DonorError, Result};
use crate::records::DonorRecord;

pub fn parse_donor(input: &str) -> Result<DonorRecord> {
    let trimmed = input.trim();
    let record = if trimmed.starts_with('{') {
        parse_structured(trimmed)?
    } else {
        parse_shorthand(trimmed)?
    };
    validate(input, &record)?;
    debug!("Parsed donor record {:?}", record);
    Ok(record)
}

pub fn parse_structured(input: &str) -> Result<DonorRecord> {
    serde_json::from_str(input).map_err(|e| DonorError::input(input, e.to_string()))
}

pub fn parse_shorthand(input: &str) -> Result<DonorRecord> {
    let parts: Vec<&str> = input.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(DonorError::input(
            input,
            format!("expected 3 comma-separated fields, got {}", parts.len()),
        ));
    }
    let months = parse_months(input, parts[2])?;

    Ok(DonorRecord {
        blood_group: parts[0].to_string(),
        city: parts[1].to_string(),
        is_available: 1,
        months_since_last_donation: months,
    })
}

fn parse_months(input: &str, field: &str) -> Result<u32> {
    let not_months = |detail: String| {
        DonorError::input(
            input,
            format!("months {:?} is not a non-negative integer{}", field, detail),
        )
    };
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(not_months(String::new()));
    }
    field.parse::<u32>().map_err(|e| not_months(format!(": {}", e)))
}

/// A requested blood group must be one of the canonical eight; unlike a
/// donor's own group it has no meaningful "unknown" reading.
pub fn parse_blood_group(input: &str) -> Result<String> {
    let blood_group = input.trim();
    match encode_blood_group(blood_group) {
        CategoryCode::Known(_) => Ok(blood_group.to_string()),
        CategoryCode::Unknown => Err(DonorError::input(
            input,
            format!("blood group must be one of {}", BLOOD_GROUPS.join(", ")),
        )),
    }
}

fn validate(input: &str, record: &DonorRecord) -> Result<()> {
    if record.is_available > 1 {
        return Err(DonorError::input(
            input,
            format!("isAvailable must be 0 or 1, got {}", record.is_available),
        ));
    }
    Ok(())
}
