//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for cryptofolio.
#[derive(Debug, thiserror::Error)]
pub enum CryptofolioError {
    #[error("price provider error: {reason}")]
    Provider { reason: String },

    #[error("price parse error: {reason}")]
    PriceParse { reason: String },

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

    #[error(
        "portfolio '{portfolio}' does not match the return table: missing weights for [{}], no returns for [{}]",
        missing.join(", "),
        unexpected.join(", ")
    )]
    MismatchedAssets {
        portfolio: String,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("insufficient price history: have {rows} complete rows, need {minimum}")]
    InsufficientData { rows: usize, minimum: usize },

    #[error("invalid table row for {date}: {reason}")]
    InvalidTable { date: NaiveDate, reason: String },

    #[error("chart rendering error: {reason}")]
    Chart { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&CryptofolioError> for std::process::ExitCode {
    fn from(err: &CryptofolioError) -> Self {
        let code: u8 = match err {
            CryptofolioError::Io(_) | CryptofolioError::Chart { .. } => 1,
            CryptofolioError::ConfigParse { .. }
            | CryptofolioError::ConfigMissing { .. }
            | CryptofolioError::ConfigInvalid { .. } => 2,
            CryptofolioError::Provider { .. } | CryptofolioError::PriceParse { .. } => 3,
            CryptofolioError::MismatchedAssets { .. } => 4,
            CryptofolioError::InsufficientData { .. } | CryptofolioError::InvalidTable { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
