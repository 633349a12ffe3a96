//! Domain error types.

use chrono::NaiveDateTime;

/// Top-level error type for stocksim.
#[derive(Debug, thiserror::Error)]
pub enum StocksimError {
    #[error("invalid portfolio configuration: {reason}")]
    InvalidPortfolioConfig { reason: String },

    #[error("temporal order violation: cannot move from {current} to {requested}{}", deadline_suffix(.deadline))]
    TemporalOrderViolation {
        current: NaiveDateTime,
        requested: NaiveDateTime,
        deadline: Option<NaiveDateTime>,
    },

    #[error("unknown symbol: {symbol}")]
    UnknownSymbol { symbol: String },

    #[error("timestamp {timestamp} is outside series domain [{min}, {max}]")]
    OutOfDomain { timestamp: f64, min: f64, max: f64 },

    #[error("invalid series: {reason}")]
    InvalidSeries { reason: String },

    #[error("invalid stock metadata: {reason}")]
    InvalidMetadata { reason: String },

    #[error("empty evaluation history: {reason}")]
    EmptyHistory { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("price data error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn deadline_suffix(deadline: &Option<NaiveDateTime>) -> String {
    match deadline {
        Some(d) => format!(" (deadline {d})"),
        None => String::new(),
    }
}

impl From<&StocksimError> for std::process::ExitCode {
    fn from(err: &StocksimError) -> Self {
        let code: u8 = match err {
            StocksimError::Io(_) => 1,
            StocksimError::ConfigParse { .. }
            | StocksimError::ConfigMissing { .. }
            | StocksimError::ConfigInvalid { .. } => 2,
            StocksimError::Data { .. } | StocksimError::InvalidSeries { .. } => 3,
            StocksimError::InvalidPortfolioConfig { .. }
            | StocksimError::TemporalOrderViolation { .. }
            | StocksimError::UnknownSymbol { .. }
            | StocksimError::OutOfDomain { .. }
            | StocksimError::InvalidMetadata { .. } => 4,
            StocksimError::EmptyHistory { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
