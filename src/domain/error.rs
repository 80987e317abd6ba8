//! Domain error types.

/// Top-level error type for voltrader.
#[derive(Debug, thiserror::Error)]
pub enum VoltraderError {
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

    // `source` is reserved by thiserror for error chaining, so the field
    // carrying the data source's name gets a distinct name.
    #[error("no bars loaded from {data_source}")]
    NoData { data_source: String },

    #[error("non-monotonic timestamp at row {index}: {timestamp}")]
    NonMonotonicTimestamp { index: usize, timestamp: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&VoltraderError> for std::process::ExitCode {
    fn from(err: &VoltraderError) -> Self {
        let code: u8 = match err {
            VoltraderError::Io(_) => 1,
            VoltraderError::ConfigParse { .. }
            | VoltraderError::ConfigMissing { .. }
            | VoltraderError::ConfigInvalid { .. } => 2,
            VoltraderError::Data { .. }
            | VoltraderError::NoData { .. }
            | VoltraderError::NonMonotonicTimestamp { .. } => 3,
            VoltraderError::Report { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
