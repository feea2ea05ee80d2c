use std::fmt;
use std::process::ExitCode;

use attendance_core::AttendanceError;
use serde::Serialize;

use crate::storage::StorageError;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_INPUT_ERROR: u8 = 2;
pub const EXIT_RUNTIME_ERROR: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    Runtime,
}

#[derive(Debug)]
pub struct CliError {
    kind: ErrorKind,
    message: String,
    status: Option<&'static str>,
}

impl CliError {
    pub fn input(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Input,
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(message: impl Into<String>, status: &'static str) -> Self {
        Self {
            kind: ErrorKind::Input,
            message: message.into(),
            status: Some(status),
        }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Runtime,
            message: message.into(),
            status: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn status(&self) -> Option<&'static str> {
        self.status
    }

    pub fn exit_code(&self) -> u8 {
        match self.kind {
            ErrorKind::Input => EXIT_INPUT_ERROR,
            ErrorKind::Runtime => EXIT_RUNTIME_ERROR,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<AttendanceError> for CliError {
    fn from(err: AttendanceError) -> Self {
        let message = err.to_string();
        match err {
            AttendanceError::MalformedInput { .. } | AttendanceError::Csv { .. } => {
                CliError::with_status(message, "malformed_input")
            }
            AttendanceError::UnsupportedMonth { .. } => {
                CliError::with_status(message, "unsupported_month")
            }
            AttendanceError::MalformedDate { .. } => {
                CliError::with_status(message, "malformed_date")
            }
            AttendanceError::OutsideReportingPeriod { .. } => {
                CliError::with_status(message, "outside_reporting_period")
            }
            AttendanceError::Output(_) => CliError::runtime(message),
        }
    }
}

impl From<StorageError> for CliError {
    fn from(err: StorageError) -> Self {
        CliError::runtime(err.to_string())
    }
}

pub type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug, Serialize)]
struct ErrorOutput {
    error: String,
    exit_code: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<String>,
}

pub fn render_error(err: &CliError, output_format: OutputFormat) -> ExitCode {
    match output_format {
        OutputFormat::Json => {
            let envelope = ErrorOutput {
                error: err.message.clone(),
                exit_code: err.exit_code(),
                status: err.status.map(str::to_string),
            };

            match serde_json::to_string_pretty(&envelope) {
                Ok(json) => eprintln!("{}", json),
                Err(_) => eprintln!("Error: {}", err.message),
            }
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", err.message);
        }
    }

    ExitCode::from(err.exit_code())
}

pub fn output_format_hint(s: &str) -> OutputFormat {
    if s.eq_ignore_ascii_case("json") {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    }
}

pub fn parse_output_format(s: &str) -> CliResult<OutputFormat> {
    match s.to_lowercase().as_str() {
        "json" => Ok(OutputFormat::Json),
        "text" => Ok(OutputFormat::Text),
        _ => Err(CliError::input(format!(
            "Invalid output_format '{}'. Expected: json, text",
            s
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn date_errors_are_input_errors_with_status() {
        let err: CliError = AttendanceError::UnsupportedMonth {
            label: "07/04".to_string(),
            month: 7,
        }
        .into();
        assert_eq!(err.exit_code(), EXIT_INPUT_ERROR);
        assert_eq!(err.status(), Some("unsupported_month"));

        let err: CliError = AttendanceError::OutsideReportingPeriod {
            today: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
        }
        .into();
        assert_eq!(err.status(), Some("outside_reporting_period"));
    }

    #[test]
    fn storage_errors_are_runtime_errors() {
        let err: CliError = StorageError::NotFound {
            container: "bucket".to_string(),
            key: "feed.csv".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Runtime);
        assert_eq!(err.exit_code(), EXIT_RUNTIME_ERROR);
        assert!(err.to_string().contains("bucket/feed.csv"));
    }

    #[test]
    fn output_format_parsing() {
        assert_eq!(parse_output_format("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(parse_output_format("text").unwrap(), OutputFormat::Text);
        assert!(parse_output_format("yaml").is_err());
        assert_eq!(output_format_hint("yaml"), OutputFormat::Text);
    }
}
