use std::path::PathBuf;
use std::time::Duration;

use attendance_core::{UnresolvedDatePolicy, reporting_start_year};
use chrono::NaiveDate;

use crate::cli::RunArgs;
use crate::error::{CliError, CliResult};
use crate::shared::{parse_policy, parse_store_kind, parse_tz_or_input_error, resolve_today};
use crate::storage::StoreKind;

/// One raw export to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSource {
    /// Name used in logs and error messages.
    pub name: &'static str,
    pub key: String,
}

/// Validated settings for one run of the job.
#[derive(Debug, Clone)]
pub struct JobConfig {
    pub bucket: String,
    pub feeds: [FeedSource; 3],
    pub upload_bucket: String,
    pub output_key_template: String,
    pub store: StoreKind,
    pub fs_root: PathBuf,
    pub today: NaiveDate,
    pub policy: UnresolvedDatePolicy,
    pub timeout: Duration,
    pub retry_delay: Duration,
}

impl JobConfig {
    pub fn from_args(args: RunArgs) -> CliResult<Self> {
        let tz = parse_tz_or_input_error(&args.timezone)?;
        let today = resolve_today(args.today.as_deref(), tz)?;

        for (setting, value) in [
            ("bucket", &args.bucket),
            ("feed_a_key", &args.feed_a_key),
            ("feed_b_key", &args.feed_b_key),
            ("feed_c_key", &args.feed_c_key),
            ("upload_bucket", &args.upload_bucket),
            ("output_key", &args.output_key),
        ] {
            if value.trim().is_empty() {
                return Err(CliError::input(format!("Setting '{}' must not be empty", setting)));
            }
        }

        if args.timeout_secs == 0 {
            return Err(CliError::input("Setting 'timeout_secs' must be positive"));
        }

        Ok(JobConfig {
            bucket: args.bucket,
            feeds: [
                FeedSource {
                    name: "feed-a",
                    key: args.feed_a_key,
                },
                FeedSource {
                    name: "feed-b",
                    key: args.feed_b_key,
                },
                FeedSource {
                    name: "feed-c",
                    key: args.feed_c_key,
                },
            ],
            upload_bucket: args.upload_bucket,
            output_key_template: args.output_key,
            store: parse_store_kind(&args.store)?,
            fs_root: PathBuf::from(args.fs_root),
            today,
            policy: parse_policy(&args.on_unresolved)?,
            timeout: Duration::from_secs(args.timeout_secs),
            retry_delay: Duration::from_millis(args.retry_delay_ms),
        })
    }

    /// Output key with `{year}` replaced by the reporting period's start year.
    pub fn output_key(&self) -> CliResult<String> {
        if !self.output_key_template.contains("{year}") {
            return Ok(self.output_key_template.clone());
        }
        let year = reporting_start_year(self.today)?;
        Ok(self
            .output_key_template
            .replace("{year}", &year.to_string()))
    }
}
