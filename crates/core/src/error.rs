// ABOUTME: Error types for the extraction core including ErrorCode enum and ExtractError struct.
// ABOUTME: Provides categorized errors with convenience constructors and boolean helpers.

use std::fmt;

/// Error codes representing different categories of extraction failures.
///
/// Per-document problems (missing fields, malformed dates, missing article
/// roots) are never errors; they are logged and the field or document is
/// skipped. These codes cover the caller-level conditions only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    UnknownPortal,
    Config,
    Io,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::UnknownPortal => "unknown portal",
            ErrorCode::Config => "invalid configuration",
            ErrorCode::Io => "io error",
        };
        write!(f, "{}", s)
    }
}

/// The main error type for extraction and configuration operations.
#[derive(Debug, thiserror::Error)]
pub struct ExtractError {
    pub code: ErrorCode,
    /// Portal id, URL or file path the error refers to.
    pub target: String,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hirek: {} {}: {}", self.op, self.target, self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl ExtractError {
    /// Create an UnknownPortal error.
    pub fn unknown_portal(target: impl Into<String>, op: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::UnknownPortal,
            target: target.into(),
            op: op.into(),
            source: None,
        }
    }

    /// Create a Config error.
    pub fn config(
        target: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code: ErrorCode::Config,
            target: target.into(),
            op: op.into(),
            source,
        }
    }

    /// Create an Io error.
    pub fn io(target: impl Into<String>, op: impl Into<String>, source: std::io::Error) -> Self {
        Self {
            code: ErrorCode::Io,
            target: target.into(),
            op: op.into(),
            source: Some(anyhow::Error::new(source)),
        }
    }

    /// Returns true if this is an UnknownPortal error.
    pub fn is_unknown_portal(&self) -> bool {
        self.code == ErrorCode::UnknownPortal
    }

    /// Returns true if this is a Config error.
    pub fn is_config(&self) -> bool {
        self.code == ErrorCode::Config
    }

    /// Returns true if this is an Io error.
    pub fn is_io(&self) -> bool {
        self.code == ErrorCode::Io
    }
}
