use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;

use attendance_core::UnresolvedDatePolicy;

use crate::error::{CliError, CliResult};
use crate::storage::StoreKind;

pub fn parse_tz_or_input_error(name: &str) -> CliResult<Tz> {
    name.parse::<Tz>()
        .map_err(|_| CliError::input(format!("Invalid timezone '{}'", name)))
}

/// The reference date: an explicit `YYYY-MM-DD`, or the current date in `tz`.
pub fn resolve_today(explicit: Option<&str>, tz: Tz) -> CliResult<NaiveDate> {
    match explicit {
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| {
            CliError::input(format!(
                "Invalid today '{}'. Expected YYYY-MM-DD: {}",
                s, e
            ))
        }),
        None => Ok(Utc::now().with_timezone(&tz).date_naive()),
    }
}

pub fn parse_policy(s: &str) -> CliResult<UnresolvedDatePolicy> {
    match s.to_lowercase().as_str() {
        "error" => Ok(UnresolvedDatePolicy::Error),
        "skip" => Ok(UnresolvedDatePolicy::Skip),
        _ => Err(CliError::input(format!(
            "Invalid on_unresolved '{}'. Expected: error, skip",
            s
        ))),
    }
}

pub fn parse_store_kind(s: &str) -> CliResult<StoreKind> {
    match s.to_lowercase().as_str() {
        "gcs" => Ok(StoreKind::Gcs),
        "fs" => Ok(StoreKind::Fs),
        _ => Err(CliError::input(format!(
            "Invalid store '{}'. Expected: gcs, fs",
            s
        ))),
    }
}
