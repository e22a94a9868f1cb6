//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for tradetrack.
#[derive(Debug, thiserror::Error)]
pub enum TradeTrackError {
    #[error("no price bar for {ticker} on {date}")]
    NotFound { ticker: String, date: NaiveDate },

    #[error("insufficient history: have {observations} observations, need {minimum}")]
    InsufficientHistory { observations: usize, minimum: usize },

    #[error("invalid price {price} for {context}")]
    InvalidPrice { price: f64, context: String },

    #[error("indicator undefined on {date}: {reason}")]
    UndefinedIndicator { date: NaiveDate, reason: String },

    #[error("empty price series for {ticker}")]
    EmptySeries { ticker: String },

    #[error("model fit failed: {reason}")]
    ModelFit { reason: String },

    #[error("data error: {reason}")]
    Data { reason: String },

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

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TradeTrackError> for std::process::ExitCode {
    fn from(err: &TradeTrackError) -> Self {
        let code: u8 = match err {
            TradeTrackError::Io(_) => 1,
            TradeTrackError::ConfigParse { .. }
            | TradeTrackError::ConfigMissing { .. }
            | TradeTrackError::ConfigInvalid { .. } => 2,
            TradeTrackError::Data { .. } => 3,
            TradeTrackError::NotFound { .. }
            | TradeTrackError::InsufficientHistory { .. }
            | TradeTrackError::InvalidPrice { .. }
            | TradeTrackError::UndefinedIndicator { .. }
            | TradeTrackError::EmptySeries { .. }
            | TradeTrackError::ModelFit { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
