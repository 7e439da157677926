use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Unknown report type '{0}' (expected overview, financial, projects or users)")]
    UnknownReportType(String),

    #[error("Payload is tagged '{found}' but a {expected} report was requested")]
    PayloadMismatch { expected: String, found: String },

    #[error("Invalid payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Unknown backend '{0}' (expected imperative or declarative)")]
    UnknownBackend(String),

    #[error("Backend '{0}' is not available in this build")]
    BackendUnavailable(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings error: {0}")]
    Settings(String),
}

impl ReportError {
    /// Configuration errors are raised before any drawing happens.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ReportError::UnknownReportType(_)
                | ReportError::PayloadMismatch { .. }
                | ReportError::UnknownBackend(_)
                | ReportError::BackendUnavailable(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
