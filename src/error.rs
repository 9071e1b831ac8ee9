pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can abort a check. The runner reports all of these as UNKNOWN.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("connection issue {0}")]
    Connection(#[source] reqwest::Error),
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),
    #[error("Error => {body}")]
    Api { status: u16, body: String },
    #[error("Timeout reached")]
    Timeout,
    #[error("invalid threshold {spec:?}: {reason}")]
    ThresholdParse { spec: String, reason: String },
    #[error("invalid unit {0:?}")]
    InvalidUnit(String),
    #[error("invalid metric {0:?}")]
    InvalidMetric(String),
    #[error("division by zero while converting to percent")]
    DivisionByZero,
    #[error("percent conversion requires a maximum")]
    MissingMaximum,
    #[error("invalid pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("unexpected response from ONTAP: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid duration {0:?}")]
    Duration(String),
    #[error("invalid version string {0:?}")]
    Version(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout
        } else if err.is_connect() {
            Error::Connection(err)
        } else {
            Error::Http(err)
        }
    }
}

impl Error {
    pub(crate) fn threshold(spec: &str, reason: impl Into<String>) -> Self {
        Error::ThresholdParse {
            spec: spec.to_owned(),
            reason: reason.into(),
        }
    }
}
