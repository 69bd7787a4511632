// =============================================================================
// config.rs - THE KNOBS
// =============================================================================
//
// Everything the binary needs comes from DOCKET_LEDGER_* environment
// variables, optionally seeded from a `.env` file. Every knob has a default,
// so an unset variable is never an error. A variable set to nonsense quietly
// falls back to the default as well; the log line at startup shows what the
// engine actually ended up with.
//
// The library never reads the environment. Only `main` calls `from_env`.
// =============================================================================

use std::env;
use std::path::PathBuf;

use crate::case_ref::CaseRef;
use crate::models::Subject;

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    // =========================================================================
    // INPUT
    // =========================================================================

    /// Directory of saved docket pages, one `<case_number>.html` each.
    /// Default: dockets
    pub input_dir: PathBuf,

    /// Raw comma-separated list of case numbers or docket URLs. Empty means
    /// "every page in `input_dir`".
    pub cases: String,

    // =========================================================================
    // SUBJECT
    // Already resolved upstream. We match on exactly what we're given.
    // =========================================================================
    pub first_name: String,
    pub last_name: String,
    pub middle_name: String,

    // =========================================================================
    // OUTPUT
    // =========================================================================

    /// Report path. Empty means stdout.
    pub output: Option<PathBuf>,

    /// Pretty-print the JSON report. Default: true
    pub pretty: bool,

    // =========================================================================
    // RUNTIME
    // =========================================================================

    /// Rayon worker count. 0 leaves the choice to rayon.
    pub threads: usize,

    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from the process environment (after `.env`).
    pub fn from_env() -> Self {
        // A missing .env file is the normal case.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup. Keeps tests away from the real
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let output = var("DOCKET_LEDGER_OUTPUT", "");
        let log_format = match var("DOCKET_LEDGER_LOG_FORMAT", "pretty").trim().to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Config {
            input_dir: PathBuf::from(var("DOCKET_LEDGER_INPUT_DIR", "dockets")),
            cases: var("DOCKET_LEDGER_CASES", ""),

            first_name: var("DOCKET_LEDGER_FIRST_NAME", "").trim().to_string(),
            last_name: var("DOCKET_LEDGER_LAST_NAME", "").trim().to_string(),
            middle_name: var("DOCKET_LEDGER_MIDDLE_NAME", "").trim().to_string(),

            output: if output.trim().is_empty() {
                None
            } else {
                Some(PathBuf::from(output.trim()))
            },
            pretty: var("DOCKET_LEDGER_PRETTY", "true").trim().parse().unwrap_or(true),

            threads: var("DOCKET_LEDGER_THREADS", "0").trim().parse().unwrap_or(0),
            log_format,
        }
    }

    /// The subject, or `None` when either required name is blank.
    pub fn subject(&self) -> Option<Subject> {
        if self.first_name.is_empty() || self.last_name.is_empty() {
            return None;
        }
        Some(Subject::new(&self.first_name, &self.last_name).with_middle_name(&self.middle_name))
    }

    /// Cases named explicitly in the configuration, in the order given.
    /// Blank entries are skipped and repeats are kept once.
    pub fn case_list(&self) -> Vec<CaseRef> {
        let mut cases: Vec<CaseRef> = Vec::new();
        for case in self.cases.split(',').filter_map(CaseRef::parse) {
            if !cases.iter().any(|c| c.case_number == case.case_number) {
                cases.push(case);
            }
        }
        cases
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = config_from(&[]);
        assert_eq!(config.input_dir, PathBuf::from("dockets"));
        assert!(config.pretty);
        assert_eq!(config.threads, 0);
        assert_eq!(config.output, None);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.subject().is_none());
        assert!(config.case_list().is_empty());
    }

    #[test]
    fn test_garbage_values_fall_back_to_defaults() {
        let config = config_from(&[
            ("DOCKET_LEDGER_THREADS", "lots"),
            ("DOCKET_LEDGER_PRETTY", "maybe"),
            ("DOCKET_LEDGER_LOG_FORMAT", "JSON"),
        ]);
        assert_eq!(config.threads, 0);
        assert!(config.pretty);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_subject_and_cases_are_resolved() {
        let config = config_from(&[
            ("DOCKET_LEDGER_FIRST_NAME", " John "),
            ("DOCKET_LEDGER_LAST_NAME", "Smith"),
            (
                "DOCKET_LEDGER_CASES",
                "CF-19-123 CT 1, ,https://courts.example/dockets?db=tulsa&number=CM-2021-5,CF-2019-123",
            ),
        ]);
        let subject = config.subject().unwrap();
        assert_eq!(subject.docket_name(), "SMITH, JOHN");
        assert_eq!(subject.middle_name, None);

        let cases = config.case_list();
        let numbers: Vec<&str> = cases.iter().map(|c| c.case_number.as_str()).collect();
        assert_eq!(numbers, vec!["CF-2019-123", "CM-2021-5"]);
        assert!(cases[1].url.is_some());
    }
}
