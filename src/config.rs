use std::env;
use std::path::PathBuf;

pub const DEFAULT_INPUT: &str = "fleet_snapshot.json";
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// Runtime settings for the report binary.
///
/// The input path comes from the first positional argument, falling back to
/// `FLEET_INPUT`. Everything else is read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub preview_rows: usize,
    /// Explicit tab names; empty means auto-detect.
    pub ranges: Vec<String>,
    pub issues_only: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::resolve(env::args().nth(1), |key| env::var(key).ok())
    }

    pub fn resolve<F>(arg: Option<String>, var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let input = arg
            .or_else(|| var("FLEET_INPUT"))
            .unwrap_or_else(|| DEFAULT_INPUT.to_string());
        let output_dir = var("FLEET_OUTPUT_DIR").unwrap_or_else(|| ".".to_string());
        let preview_rows = var("FLEET_PREVIEW_ROWS")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_PREVIEW_ROWS);
        let ranges = var("FLEET_RANGES")
            .map(|v| parse_ranges(&v))
            .unwrap_or_default();
        let issues_only = var("FLEET_ISSUES_ONLY")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        AppConfig {
            input: PathBuf::from(input),
            output_dir: PathBuf::from(output_dir),
            preview_rows,
            ranges,
            issues_only,
        }
    }
}

/// Split a comma-separated tab list, dropping blanks and any `!A:J` suffix.
pub fn parse_ranges(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|r| r.split('!').next().unwrap_or_default().trim())
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect()
}
