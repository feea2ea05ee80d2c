use std::process::ExitCode;

use attendance_core::{RawTable, consolidate, to_csv_bytes};
use tracing::info;

use crate::cli::RunArgs;
use crate::config::{FeedSource, JobConfig};
use crate::error::{CliError, CliResult, EXIT_SUCCESS};
use crate::storage::{ObjectStore, Resilient, Store};

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSummary {
    pub records: usize,
    pub container: String,
    pub key: String,
}

pub fn run_job(args: RunArgs) -> CliResult<ExitCode> {
    let config = JobConfig::from_args(args)?;
    info!(
        bucket = %config.bucket,
        upload_bucket = %config.upload_bucket,
        store = %config.store,
        today = %config.today,
        policy = %config.policy,
        "starting attendance consolidation"
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::runtime(format!("Failed to start runtime: {}", e)))?;

    let summary = runtime.block_on(open_and_execute(&config))?;

    info!(
        records = summary.records,
        container = %summary.container,
        key = %summary.key,
        "attendance chart written"
    );

    Ok(ExitCode::from(EXIT_SUCCESS))
}

async fn open_and_execute(config: &JobConfig) -> CliResult<JobSummary> {
    let store = Store::open(config.store, &config.fs_root).await?;
    let store = Resilient::new(store, config.timeout, config.retry_delay);
    execute(&store, config).await
}

/// Fetch, consolidate, and upload. Nothing is written if any step fails.
pub async fn execute<S: ObjectStore>(store: &S, config: &JobConfig) -> CliResult<JobSummary> {
    let [feed_a, feed_b, feed_c] = &config.feeds;
    let (a, b, c) = tokio::try_join!(
        fetch_feed(store, &config.bucket, feed_a),
        fetch_feed(store, &config.bucket, feed_b),
        fetch_feed(store, &config.bucket, feed_c),
    )?;

    let records = consolidate(vec![a, b, c], config.today, config.policy)?;
    info!(records = records.len(), "consolidated attendance records");

    let body = to_csv_bytes(&records)?;
    let key = config.output_key()?;
    store.put(&config.upload_bucket, &key, body).await?;

    Ok(JobSummary {
        records: records.len(),
        container: config.upload_bucket.clone(),
        key,
    })
}

async fn fetch_feed<S: ObjectStore>(
    store: &S,
    bucket: &str,
    feed: &FeedSource,
) -> CliResult<RawTable> {
    let bytes = store.get(bucket, &feed.key).await?;
    info!(feed = feed.name, key = %feed.key, bytes = bytes.len(), "fetched feed");
    Ok(RawTable::from_csv_bytes(feed.name, &bytes)?)
}
