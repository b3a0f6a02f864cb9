use std::fmt;

use chrono::NaiveDate;

/// Binary-level error: a process exit code plus a human-readable message.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    /// Wrap an ingest failure, choosing the exit code from its kind.
    pub fn ingest(context: impl fmt::Display, err: &IngestError) -> Self {
        let code = match err.kind() {
            ErrorKind::Transport => 4,
            ErrorKind::Decode | ErrorKind::Schema | ErrorKind::Value => 3,
        };
        Self::new(code, format!("{context}: {err}"))
    }

    pub fn sink(context: impl fmt::Display, err: &SinkError) -> Self {
        Self::new(5, format!("{context}: {err}"))
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Coarse classification of ingest failures.
///
/// All kinds are treated the same way (the source is abandoned), the kind only
/// tells an operator where to look.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The fetch could not complete.
    Transport,
    /// The byte stream is not valid CSV/JSON, or has no header.
    Decode,
    /// Rows do not have the shape the header declares.
    Schema,
    /// A date or number field cannot be parsed.
    Value,
}

/// Failure while fetching or normalizing one source.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("cannot fetch {url}: {reason}")]
    Transport { url: String, reason: String },

    #[error("cannot read {stage}: {source}")]
    Csv {
        stage: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("cannot decode JSON document: {source}")]
    Json {
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot read header CSV record: input is empty")]
    MissingHeader,

    #[error("unexpected column length ({found}, expected {expected}) on line {line}")]
    ColumnCount {
        line: u64,
        found: usize,
        expected: String,
    },

    #[error("date column {date} appears more than once in the header")]
    DuplicateDate { date: NaiveDate },

    #[error("history is not rectangular: {reason}")]
    NotRectangular { reason: String },

    #[error("cannot parse date `{value}` on line {line}: {reason}")]
    InvalidDate {
        line: u64,
        value: String,
        reason: String,
    },

    #[error("cannot parse timeline date `{value}` for {country}: {reason}")]
    InvalidTimelineDate {
        country: String,
        value: String,
        reason: String,
    },

    #[error("cannot parse {field} `{value}` on line {line}: {reason}")]
    InvalidNumber {
        line: u64,
        field: &'static str,
        value: String,
        reason: String,
    },
}

impl IngestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Csv { .. } | Self::Json { .. } | Self::MissingHeader => ErrorKind::Decode,
            Self::ColumnCount { .. } | Self::DuplicateDate { .. } | Self::NotRectangular { .. } => {
                ErrorKind::Schema
            }
            Self::InvalidDate { .. } | Self::InvalidTimelineDate { .. } | Self::InvalidNumber { .. } => {
                ErrorKind::Value
            }
        }
    }

    pub fn csv(stage: &'static str, source: csv::Error) -> Self {
        Self::Csv { stage, source }
    }

    pub fn transport(url: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::Transport {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

/// Failure while handing points to a time-series store.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("cannot execute write request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("write rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("cannot write line protocol: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot build points: {0}")]
    Point(#[from] IngestError),
}
