//! Error types for the capture side of the pipeline.

use thiserror::Error;

/// Result type alias for capture operations
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Capture-side failure taxonomy. Permission problems are terminal and need
/// user action; device problems are transient and a caller may retry by
/// invoking start again; stream and encode failures are per-segment.
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Audio permission denied: {0}")]
    PermissionDenied(String),

    #[error("Audio device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Audio stream error: {0}")]
    Stream(String),

    #[error("Segment encoding failed: {0}")]
    Encode(#[from] hound::Error),
}

impl CaptureError {
    /// Host APIs report denied microphone access as a backend-specific string,
    /// not a dedicated error type. Classify by description.
    fn classify(desc: String) -> Self {
        let lower = desc.to_lowercase();
        if lower.contains("permission") || lower.contains("denied") || lower.contains("access") {
            CaptureError::PermissionDenied(desc)
        } else {
            CaptureError::DeviceUnavailable(desc)
        }
    }
}

impl From<cpal::DevicesError> for CaptureError {
    fn from(err: cpal::DevicesError) -> Self {
        CaptureError::DeviceUnavailable(err.to_string())
    }
}

impl From<cpal::DefaultStreamConfigError> for CaptureError {
    fn from(err: cpal::DefaultStreamConfigError) -> Self {
        match err {
            cpal::DefaultStreamConfigError::DeviceNotAvailable => {
                CaptureError::DeviceUnavailable("input device disconnected".to_string())
            }
            other => CaptureError::classify(other.to_string()),
        }
    }
}

impl From<cpal::BuildStreamError> for CaptureError {
    fn from(err: cpal::BuildStreamError) -> Self {
        match err {
            cpal::BuildStreamError::DeviceNotAvailable => {
                CaptureError::DeviceUnavailable("input device disconnected".to_string())
            }
            other => CaptureError::classify(other.to_string()),
        }
    }
}

impl From<cpal::PlayStreamError> for CaptureError {
    fn from(err: cpal::PlayStreamError) -> Self {
        CaptureError::Stream(err.to_string())
    }
}

impl From<cpal::StreamError> for CaptureError {
    fn from(err: cpal::StreamError) -> Self {
        match err {
            cpal::StreamError::DeviceNotAvailable => {
                CaptureError::DeviceUnavailable("input device disconnected".to_string())
            }
            other => CaptureError::Stream(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_strings_classify_as_permission_denied() {
        assert!(matches!(
            CaptureError::classify("Access denied by the OS".to_string()),
            CaptureError::PermissionDenied(_)
        ));
        assert!(matches!(
            CaptureError::classify("device busy".to_string()),
            CaptureError::DeviceUnavailable(_)
        ));
    }
}
