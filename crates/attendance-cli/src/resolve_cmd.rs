use std::process::ExitCode;

use attendance_core::{ResolvedDate, resolve_label};
use chrono::NaiveDate;

use crate::cli::ResolveArgs;
use crate::error::{CliError, CliResult, EXIT_SUCCESS, OutputFormat};
use crate::shared::{parse_tz_or_input_error, resolve_today};

pub fn run_resolve(args: ResolveArgs, output_format: OutputFormat) -> CliResult<ExitCode> {
    let tz = parse_tz_or_input_error(&args.timezone)?;
    let today = resolve_today(args.today.as_deref(), tz)?;

    let resolved = resolve_all(&args.labels, today)?;

    match output_format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&resolved)
                .map_err(|e| CliError::runtime(format!("Failed to serialize JSON: {}", e)))?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            for date in &resolved {
                println!("{} -> {} ({})", date.label, date.formatted, date.period);
            }
        }
    }

    Ok(ExitCode::from(EXIT_SUCCESS))
}

fn resolve_all(labels: &[String], today: NaiveDate) -> CliResult<Vec<ResolvedDate>> {
    labels
        .iter()
        .map(|label| resolve_label(label, today).map_err(CliError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_labels_in_order() {
        let today = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        let labels = vec!["=\"09/03\"".to_string(), "02/14".to_string()];

        let resolved = resolve_all(&labels, today).unwrap();

        assert_eq!(resolved[0].formatted, "09/03/2024");
        assert_eq!(resolved[1].formatted, "02/14/2025");
    }

    #[test]
    fn first_bad_label_fails_with_status() {
        let today = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        let labels = vec!["02/14".to_string(), "07/01".to_string()];

        let err = resolve_all(&labels, today).unwrap_err();

        assert_eq!(err.status(), Some("unsupported_month"));
    }
}
