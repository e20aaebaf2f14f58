//! Domain error types.

/// Top-level error type for levsim.
#[derive(Debug, thiserror::Error)]
pub enum LevsimError {
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

    #[error("invalid price on line {line} ('{value}'): {reason}")]
    PriceParse {
        line: usize,
        value: String,
        reason: String,
    },

    #[error("no historical price changes to sample from")]
    EmptyPriceOptions,

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error("worker failure: {reason}")]
    Worker { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&LevsimError> for std::process::ExitCode {
    fn from(err: &LevsimError) -> Self {
        let code: u8 = match err {
            LevsimError::Io(_) => 1,
            LevsimError::ConfigParse { .. }
            | LevsimError::ConfigMissing { .. }
            | LevsimError::ConfigInvalid { .. } => 2,
            LevsimError::PriceParse { .. } | LevsimError::EmptyPriceOptions => 3,
            LevsimError::Report { .. } => 4,
            LevsimError::Worker { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
