//! Error type shared by the encoder, renderer and session.

use std::io;
use std::path::PathBuf;

use crate::qrcode::EcLevel;

/// Errors that can occur while generating or saving a QR code.
#[derive(Debug, thiserror::Error)]
pub enum QrError {
    #[error("Input text is empty")]
    InvalidInput,

    #[error(
        "Data too long: {len} bytes, version {version} at level {ec_level} holds at most {capacity} bytes"
    )]
    CapacityExceeded {
        len: usize,
        capacity: usize,
        version: u8,
        ec_level: EcLevel,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: String,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl QrError {
    /// Wraps an image encoding failure for `path` as an I/O error.
    pub(crate) fn from_image(path: impl Into<PathBuf>, err: image::ImageError) -> Self {
        let source = match err {
            image::ImageError::IoError(source) => source,
            other => io::Error::other(other),
        };
        QrError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for qrsnap operations.
pub type Result<T> = std::result::Result<T, QrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_message_names_limits() {
        let err = QrError::CapacityExceeded {
            len: 3000,
            capacity: 2953,
            version: 40,
            ec_level: EcLevel::Low,
        };
        assert_eq!(
            err.to_string(),
            "Data too long: 3000 bytes, version 40 at level L holds at most 2953 bytes"
        );
    }

    #[test]
    fn test_image_io_error_is_unwrapped() {
        let io = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err = QrError::from_image("out.png", image::ImageError::IoError(io));
        match err {
            QrError::Io { path, source } => {
                assert_eq!(path, PathBuf::from("out.png"));
                assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
            }
            other => panic!("expected Io, got {other:?}"),
        }
    }
}
