//! INI file configuration adapter.

use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    /// Trimmed value, `None` when absent or blank.
    fn value(&self, section: &str, key: &str) -> Option<String> {
        self.config
            .get(section, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Parses `[section] key`, falling back to `default` with a warning when
    /// the value is present but malformed.
    fn parsed<T, F>(&self, section: &str, key: &str, default: T, parse: F) -> T
    where
        T: std::fmt::Display,
        F: FnOnce(&str) -> Option<T>,
    {
        let Some(raw) = self.value(section, key) else {
            return default;
        };
        match parse(&raw) {
            Some(v) => v,
            None => {
                tracing::warn!(
                    section,
                    key,
                    value = %raw,
                    %default,
                    "unparsable config value; using default"
                );
                default
            }
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.value(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.parsed(section, key, default, |v| v.parse().ok())
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.parsed(section, key, default, |v| v.parse().ok())
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.parsed(section, key, default, parse_bool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[data]
dir = /var/lib/prices

[backtest]
initial_fund = 100000.0
weekdays = mon,tue,wed

[strategy]
kind = buy_and_hold
seed = 7
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("data", "dir"),
            Some("/var/lib/prices".to_string())
        );
        assert_eq!(
            adapter.get_string("backtest", "weekdays"),
            Some("mon,tue,wed".to_string())
        );
        assert_eq!(adapter.get_int("strategy", "seed", 0), 7);
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[backtest]\ninitial_fund = 100\n").unwrap();
        assert_eq!(adapter.get_string("backtest", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    const SIMULATION: &str = r#"
[simulation]
num_simulations = 25
initial_price = 1000.5
daily_change =  -2.5
daily_fluctuation = lots
seed =
"#;

    #[test]
    fn simulation_numbers_parse_with_whitespace() {
        let adapter = FileConfigAdapter::from_string(SIMULATION).unwrap();
        assert_eq!(adapter.get_int("simulation", "num_simulations", 100), 25);
        assert_eq!(adapter.get_double("simulation", "initial_price", 0.0), 1000.5);
        assert_eq!(adapter.get_double("simulation", "daily_change", 5.0), -2.5);
    }

    #[test]
    fn malformed_or_blank_values_fall_back_to_default() {
        let adapter = FileConfigAdapter::from_string(SIMULATION).unwrap();
        assert_eq!(
            adapter.get_double("simulation", "daily_fluctuation", 200.0),
            200.0
        );
        assert_eq!(adapter.get_int("simulation", "initial_price", 7), 7);
        assert_eq!(adapter.get_string("simulation", "seed"), None);
        assert_eq!(adapter.get_int("simulation", "missing", 3), 3);
    }

    #[test]
    fn non_finite_numbers_pass_through_for_validation() {
        let adapter =
            FileConfigAdapter::from_string("[simulation]
daily_change = nan
initial_fund = inf
")
                .unwrap();
        assert!(adapter.get_double("simulation", "daily_change", 5.0).is_nan());
        assert_eq!(
            adapter.get_double("simulation", "initial_fund", 1.0),
            f64::INFINITY
        );
    }

    #[test]
    fn daily_resample_flag() {
        let adapter = FileConfigAdapter::from_string(
            "[data]
daily_resample = off
alt = YES
bad = maybe
",
        )
        .unwrap();
        assert!(!adapter.get_bool("data", "daily_resample", true));
        assert!(adapter.get_bool("data", "alt", false));
        assert!(adapter.get_bool("data", "bad", true));
        assert!(adapter.get_bool("data", "missing", true));
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[report]\noutput = /tmp/report.csv\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("report", "output"),
            Some("/tmp/report.csv".to_string())
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/config.ini");
        assert!(result.is_err());
    }
}
