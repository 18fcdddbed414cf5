//! Error type shared by every equalization strategy.

use thiserror::Error;

use super::workers::Phase;

/// Errors reported by the equalization engine.
///
/// Validation errors are raised before any worker is spawned and before the
/// output buffer is written.
#[derive(Debug, Error)]
pub enum EqualizeError {
    /// Zero-sized image, a buffer whose length disagrees with its dimensions,
    /// or an output buffer whose dimensions differ from the input.
    #[error("invalid dimensions {width}x{height}: {detail}")]
    InvalidDimensions {
        width: u32,
        height: u32,
        detail: String,
    },

    /// Worker count of zero, or more workers than image rows.
    #[error("invalid worker count {workers} for an image with {height} rows (expected 1..={height})")]
    InvalidWorkerCount { workers: u32, height: u32 },

    /// Channel index outside of the three RGB channels.
    #[error("channel index {index} out of range (expected 0..3)")]
    ChannelIndexOutOfRange { index: usize },

    /// Array input with a channel axis other than RGB.
    #[error("unsupported channel count {channels} (expected 3)")]
    UnsupportedChannels { channels: usize },

    /// A worker task panicked; the whole equalization is abandoned.
    #[error("worker failed during {phase}: {message}")]
    WorkerFailed { phase: Phase, message: String },

    #[error("failed to build worker thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("unknown strategy '{name}' (expected sequential, channel-parallel, spatial-shared or spatial-local)")]
    UnknownStrategy { name: String },
}

impl EqualizeError {
    pub(crate) fn dimensions(width: u32, height: u32, detail: impl Into<String>) -> Self {
        EqualizeError::InvalidDimensions {
            width,
            height,
            detail: detail.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EqualizeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_count_message_names_range() {
        let err = EqualizeError::InvalidWorkerCount { workers: 9, height: 4 };
        assert_eq!(
            err.to_string(),
            "invalid worker count 9 for an image with 4 rows (expected 1..=4)"
        );
    }

    #[test]
    fn test_worker_failed_message_names_phase() {
        let err = EqualizeError::WorkerFailed {
            phase: Phase::Counting,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "worker failed during counting: boom");
    }
}
