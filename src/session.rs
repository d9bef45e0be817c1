//! Interaction state machine between a UI and the generation pipeline.
//!
//! A [`Session`] owns the text typed so far, the last generated symbol and
//! image, and the current [`Status`]. The UI feeds it input changes and button
//! presses through [`Session::set_input`], [`Session::generate`] and
//! [`Session::save_to`], then reads back the status line, the preview image
//! and any [`Notification`]s to show.
//!
//! Every failure is turned into an [`Status::Error`] plus a notification
//! before the `Err` is handed back, so a UI can ignore the returned value and
//! only render session state.
//!
//! ```rust
//! use qrsnap::session::{Session, Status};
//!
//! let mut session = Session::default();
//! assert_eq!(*session.status(), Status::Idle);
//!
//! session.set_input("https://example.com");
//! assert_eq!(*session.status(), Status::Ready);
//!
//! session.generate().unwrap();
//! assert_eq!(*session.status(), Status::Generated);
//! assert_eq!(session.image().unwrap().dimensions(), (330, 330));
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::{Colors, EncodingConfig};
use crate::error::{QrError, Result};
use crate::qrcode::{self, SymbolMatrix};
use crate::render::{self, RasterImage};

/// Default preview box, in pixels.
pub const PREVIEW_SIZE: u32 = 400;

/// Where the session is in the input → generate → save flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// No usable text.
    Idle,
    /// Non-empty text, nothing generated for it yet.
    Ready,
    /// An image is available and has not been saved.
    Generated,
    /// The image was written to disk.
    SaveSucceeded,
    /// The last operation failed.
    Error(String),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Idle => f.write_str("idle"),
            Status::Ready => f.write_str("ready"),
            Status::Generated => f.write_str("generated"),
            Status::SaveSucceeded => f.write_str("saved"),
            Status::Error(message) => write!(f, "error: {message}"),
        }
    }
}

/// How prominently a message should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// Text for the status label under the preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub severity: Severity,
    pub text: String,
}

/// A request for the UI to show a blocking message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

/// State and operations for one interactive QR generation session.
#[derive(Debug)]
pub struct Session {
    config: EncodingConfig,
    colors: Colors,
    raw_text: String,
    last_matrix: Option<SymbolMatrix>,
    last_image: Option<RasterImage>,
    last_saved: Option<PathBuf>,
    status: Status,
    notifications: VecDeque<Notification>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(EncodingConfig::default(), Colors::default())
    }
}

impl Session {
    /// Creates an empty session in the [`Status::Idle`] state.
    pub fn new(config: EncodingConfig, colors: Colors) -> Self {
        Self {
            config,
            colors,
            raw_text: String::new(),
            last_matrix: None,
            last_image: None,
            last_saved: None,
            status: Status::Idle,
            notifications: VecDeque::new(),
        }
    }

    /// Replaces the input text. Always succeeds.
    ///
    /// Drops any generated symbol and moves to [`Status::Ready`] when the
    /// trimmed text is non-empty, [`Status::Idle`] otherwise.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.raw_text = text.into();
        self.last_matrix = None;
        self.last_image = None;
        self.last_saved = None;
        self.status = if self.raw_text.trim().is_empty() {
            Status::Idle
        } else {
            Status::Ready
        };
    }

    /// Encodes and renders the current (trimmed) input.
    ///
    /// Always re-encodes, even if the text has not changed since the last call.
    ///
    /// # Errors
    ///
    /// - [`QrError::InvalidState`] if there is no usable input; the state is left unchanged.
    /// - Any encoder or renderer error; the session moves to [`Status::Error`]
    ///   with no symbol held and a critical notification queued.
    pub fn generate(&mut self) -> Result<()> {
        if !self.can_generate() {
            return Err(self.reject("generate"));
        }
        self.last_matrix = None;
        self.last_image = None;
        self.last_saved = None;

        let text = self.raw_text.trim();
        let generated = qrcode::encode(text, &self.config).and_then(|matrix| {
            let image = render::render(
                &matrix,
                self.config.module_size_px,
                self.colors.foreground,
                self.colors.background,
            )?;
            Ok((matrix, image))
        });

        match generated {
            Ok((matrix, image)) => {
                info!(
                    bytes = text.len(),
                    version = matrix.version().value(),
                    mask = matrix.mask().value(),
                    width = image.width(),
                    "QR code generated"
                );
                self.last_matrix = Some(matrix);
                self.last_image = Some(image);
                self.status = Status::Generated;
                Ok(())
            }
            Err(err) => Err(self.fail(
                "An error occurred while generating the QR code!",
                "An error occurred while generating the QR code",
                err,
            )),
        }
    }

    /// Writes the generated image to `path` as PNG at full resolution.
    ///
    /// Saving the same image again, to the same or another path, is allowed.
    ///
    /// # Errors
    ///
    /// - [`QrError::InvalidState`] if nothing has been generated; the state is left unchanged.
    /// - [`QrError::Io`] if the file cannot be written; the session moves to
    ///   [`Status::Error`] but keeps the image so the save can be retried.
    pub fn save_to(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let Some(image) = self.last_image.as_ref() else {
            return Err(self.reject("save"));
        };

        match render::save_png(image, path) {
            Ok(()) => {
                info!(path = %path.display(), "QR code saved");
                self.last_saved = Some(path.to_path_buf());
                self.status = Status::SaveSucceeded;
                Ok(())
            }
            Err(err) => Err(self.fail(
                "An error occurred while saving!",
                "Failed to save the file",
                err,
            )),
        }
    }

    /// Whether [`Session::generate`] would be accepted.
    pub fn can_generate(&self) -> bool {
        !self.raw_text.trim().is_empty()
    }

    /// Whether [`Session::save_to`] would be accepted.
    pub fn can_save(&self) -> bool {
        self.last_image.is_some()
    }

    /// Like [`Session::can_generate`], but queues a warning for the user when
    /// there is nothing to encode. UIs call this before [`Session::generate`].
    pub fn check_can_generate(&mut self) -> bool {
        if self.can_generate() {
            return true;
        }
        self.notify(Severity::Warning, "Error", "Please enter a URL!");
        false
    }

    /// Like [`Session::can_save`], but queues a warning for the user when
    /// nothing has been generated yet.
    pub fn check_can_save(&mut self) -> bool {
        if self.can_save() {
            return true;
        }
        self.notify(Severity::Warning, "Error", "Generate the QR code first!");
        false
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Human-readable status for the UI, or `None` when there is nothing to say.
    pub fn status_line(&self) -> Option<StatusLine> {
        let (severity, text) = match &self.status {
            Status::Idle | Status::Ready => return None,
            Status::Generated => (Severity::Info, "QR code generated!".to_string()),
            Status::SaveSucceeded => {
                let path = self
                    .last_saved
                    .as_deref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                (Severity::Info, format!("QR code saved: {path}"))
            }
            Status::Error(message) => (Severity::Critical, message.clone()),
        };
        Some(StatusLine { severity, text })
    }

    /// Removes and returns all pending notifications, oldest first.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain(..).collect()
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// The symbol from the last successful [`Session::generate`], if still current.
    pub fn matrix(&self) -> Option<&SymbolMatrix> {
        self.last_matrix.as_ref()
    }

    /// The full-resolution image that [`Session::save_to`] writes.
    pub fn image(&self) -> Option<&RasterImage> {
        self.last_image.as_ref()
    }

    /// A copy of the image scaled to fit `max_width`×`max_height` for display.
    pub fn preview(&self, max_width: u32, max_height: u32) -> Option<RasterImage> {
        self.last_image
            .as_ref()
            .map(|image| render::scale_for_display(image, max_width, max_height))
    }

    /// Path of the last successful save of the current image.
    pub fn last_saved(&self) -> Option<&Path> {
        self.last_saved.as_deref()
    }

    pub fn config(&self) -> &EncodingConfig {
        &self.config
    }

    pub fn colors(&self) -> &Colors {
        &self.colors
    }

    fn reject(&self, operation: &'static str) -> QrError {
        warn!(operation, state = %self.status, "Operation not allowed in current state");
        QrError::InvalidState {
            operation,
            state: self.status.to_string(),
        }
    }

    /// Records a failed operation: error status, a critical notification, a log line.
    fn fail(&mut self, status_text: &str, title: &str, err: QrError) -> QrError {
        warn!(error = %err, "{title}");
        self.status = Status::Error(status_text.to_string());
        self.notify(Severity::Critical, title, format!("{title}: {err}"));
        err
    }

    fn notify(&mut self, severity: Severity, title: &str, message: impl Into<String>) {
        self.notifications.push_back(Notification {
            severity,
            title: title.to_string(),
            message: message.into(),
        });
    }
}
