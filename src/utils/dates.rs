use crate::error::{CollectorError, Result};
use chrono::{FixedOffset, NaiveDate, Utc};

/// Today's calendar date at a fixed UTC offset.
pub fn today_at_offset(utc_offset_hours: i32) -> Result<NaiveDate> {
    let offset = FixedOffset::east_opt(utc_offset_hours * 3600).ok_or_else(|| {
        CollectorError::Config(format!("invalid UTC offset: {}h", utc_offset_hours))
    })?;
    Ok(Utc::now().with_timezone(&offset).date_naive())
}

/// Resolve the collection date: an explicit `YYYY-MM-DD` argument, or today
/// at the configured offset.
pub fn resolve_target_date(input: Option<&str>, utc_offset_hours: i32) -> Result<NaiveDate> {
    match input {
        Some(raw) => parse_date(raw),
        None => today_at_offset(utc_offset_hours),
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    // Strict shape check; chrono alone also accepts unpadded fields
    let well_formed = trimmed.len() == 10
        && trimmed
            .char_indices()
            .all(|(i, c)| if i == 4 || i == 7 { c == '-' } else { c.is_ascii_digit() });
    if !well_formed {
        return Err(CollectorError::InvalidDate(raw.to_string()));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| CollectorError::InvalidDate(raw.to_string()))
}
