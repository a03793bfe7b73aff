//! Domain error types.

/// Top-level error type for sigscan.
#[derive(Debug, thiserror::Error)]
pub enum SigscanError {
    #[error("configuration error: {reason}")]
    Configuration { reason: String },

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

    #[error("no data for {code}")]
    NoData { code: String },

    #[error("insufficient data for {code}: have {bars} bars, need {minimum}")]
    InsufficientData {
        code: String,
        bars: usize,
        minimum: usize,
    },

    #[error("invalid bar {index} for {code}: {reason}")]
    InvalidBar {
        code: String,
        index: usize,
        reason: String,
    },

    #[error("bars for {code} are not in strictly increasing date order at index {index}")]
    NonMonotonic { code: String, index: usize },

    #[error("data source error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SigscanError {
    pub fn configuration(reason: impl Into<String>) -> Self {
        SigscanError::Configuration {
            reason: reason.into(),
        }
    }

    /// Process exit status for this error kind.
    pub fn exit_status(&self) -> u8 {
        match self {
            SigscanError::Io(_) => 1,
            SigscanError::Configuration { .. }
            | SigscanError::ConfigParse { .. }
            | SigscanError::ConfigMissing { .. }
            | SigscanError::ConfigInvalid { .. } => 2,
            SigscanError::Data { .. } => 3,
            SigscanError::InvalidBar { .. } | SigscanError::NonMonotonic { .. } => 4,
            SigscanError::NoData { .. } | SigscanError::InsufficientData { .. } => 5,
        }
    }
}

impl From<&SigscanError> for std::process::ExitCode {
    fn from(err: &SigscanError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
