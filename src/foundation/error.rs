/// Convenience result type used across the crate.
pub type CdpResult<T> = Result<T, CdpError>;

/// Top-level error taxonomy used by the envelope engine and the render pipeline.
///
/// Every stage error aborts only the current render attempt. Nothing is retried
/// automatically; the caller decides whether to render again.
#[derive(thiserror::Error, Debug)]
pub enum CdpError {
    /// The external toolchain location is unset, missing or incomplete.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The render input is empty, missing or unusable.
    #[error("input error: {0}")]
    Input(String),

    /// A process or process group exceeded its wait budget.
    #[error("stage timeout: {stage} did not finish within {waited_ms} ms")]
    StageTimeout {
        /// Stage or program that timed out.
        stage: String,
        /// Budget that was exhausted, in milliseconds.
        waited_ms: u64,
    },

    /// A process exited with a failure status or printed an error marker.
    #[error("stage failure: {stage}: {output}")]
    StageFailure {
        /// Stage or program that failed.
        stage: String,
        /// Captured (possibly truncated) process output.
        output: String,
    },

    /// A stage reported success but an expected output file does not exist.
    #[error("output missing: {0}")]
    OutputMissing(String),

    /// A newer render was requested while this one was running.
    #[error("render superseded at epoch {epoch}")]
    Superseded {
        /// Epoch captured when the superseded attempt started.
        epoch: u64,
    },

    /// Invalid envelope access (for example indexing an empty envelope).
    #[error("envelope error: {0}")]
    Envelope(String),

    /// Invalid user-provided data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CdpError {
    /// Build a [`CdpError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`CdpError::Input`] value.
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Build a [`CdpError::StageTimeout`] value.
    pub fn stage_timeout(stage: impl Into<String>, waited_ms: u64) -> Self {
        Self::StageTimeout {
            stage: stage.into(),
            waited_ms,
        }
    }

    /// Build a [`CdpError::StageFailure`] value.
    pub fn stage_failure(stage: impl Into<String>, output: impl Into<String>) -> Self {
        Self::StageFailure {
            stage: stage.into(),
            output: output.into(),
        }
    }

    /// Build a [`CdpError::OutputMissing`] value.
    pub fn output_missing(msg: impl Into<String>) -> Self {
        Self::OutputMissing(msg.into())
    }

    /// Build a [`CdpError::Envelope`] value.
    pub fn envelope(msg: impl Into<String>) -> Self {
        Self::Envelope(msg.into())
    }

    /// Build a [`CdpError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// True for errors that end the attempt without being shown to the user.
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::Superseded { .. })
    }

    /// True for errors that no render attempt can recover from until the setup changes.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
