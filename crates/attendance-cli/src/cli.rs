use clap::{Parser, Subcommand};

/// Attendance consolidation job
#[derive(Parser, Debug)]
#[command(name = "attendance-job")]
#[command(about = "Consolidate school attendance exports into one dated CSV")]
#[command(version)]
pub struct Cli {
    /// Enable verbose (debug) logging
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch the three feeds, consolidate them, and upload the result
    Run(RunArgs),
    /// Resolve bare MM/DD date labels to full dates
    Resolve(ResolveArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct RunArgs {
    /// Container holding the raw feeds
    #[arg(long, env = "ATTENDANCE_BUCKET")]
    pub bucket: String,

    /// Object key of feed A
    #[arg(long, env = "ATTENDANCE_FEED_A_KEY")]
    pub feed_a_key: String,

    /// Object key of feed B
    #[arg(long, env = "ATTENDANCE_FEED_B_KEY")]
    pub feed_b_key: String,

    /// Object key of feed C
    #[arg(long, env = "ATTENDANCE_FEED_C_KEY")]
    pub feed_c_key: String,

    /// Container receiving the consolidated CSV
    #[arg(long, env = "ATTENDANCE_UPLOAD_BUCKET")]
    pub upload_bucket: String,

    /// Output object key; {year} is replaced with the school year's start year
    #[arg(long, env = "ATTENDANCE_OUTPUT_KEY", default_value = "attendance_chart_{year}.csv")]
    pub output_key: String,

    /// Storage backend: gcs, fs
    #[arg(long, env = "ATTENDANCE_STORE", default_value = "gcs")]
    pub store: String,

    /// Root directory for the fs backend (one subdirectory per container)
    #[arg(long, env = "ATTENDANCE_FS_ROOT", default_value = ".")]
    pub fs_root: String,

    /// Reference date (YYYY-MM-DD); defaults to today in --timezone
    #[arg(long, env = "ATTENDANCE_TODAY")]
    pub today: Option<String>,

    /// IANA timezone used to determine today's date
    #[arg(long, env = "ATTENDANCE_TIMEZONE", default_value = "UTC")]
    pub timezone: String,

    /// Policy for unresolvable dates: error, skip
    #[arg(long, env = "ATTENDANCE_ON_UNRESOLVED", default_value = "error")]
    pub on_unresolved: String,

    /// Timeout for each storage call, in seconds
    #[arg(long, env = "ATTENDANCE_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Delay before retrying a failed storage call, in milliseconds
    #[arg(long, env = "ATTENDANCE_RETRY_DELAY_MS", default_value_t = 1000)]
    pub retry_delay_ms: u64,
}

#[derive(clap::Args, Debug)]
pub struct ResolveArgs {
    /// Date labels, bare (08/15) or decorated (="08/15")
    #[arg(required = true)]
    pub labels: Vec<String>,

    /// Reference date (YYYY-MM-DD); defaults to today in --timezone
    #[arg(long, env = "ATTENDANCE_TODAY")]
    pub today: Option<String>,

    /// IANA timezone used to determine today's date
    #[arg(long, env = "ATTENDANCE_TIMEZONE", default_value = "UTC")]
    pub timezone: String,

    /// Output format: json, text
    #[arg(long, default_value = "text")]
    pub output_format: String,
}
