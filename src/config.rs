//! Encoding and rendering configuration.
//!
//! Everything the pipeline needs is passed explicitly through these values;
//! there is no ambient styling state.

use image::Rgb;

use crate::error::{QrError, Result};
use crate::qrcode::{EcLevel, VersionChoice};

/// Suggested file name for a saved symbol.
pub const DEFAULT_FILE_NAME: &str = "qr_code.png";

/// Largest accepted quiet zone, in modules.
pub const MAX_BORDER_MODULES: u32 = 1024;

/// Largest rendered image side, in pixels.
pub const MAX_IMAGE_SIDE_PX: u32 = 16_384;

/// Parameters for turning text into a symbol and the symbol into pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingConfig {
    /// Symbol version, or automatic selection of the smallest that fits.
    pub version: VersionChoice,

    /// Error correction level.
    pub ec_level: EcLevel,

    /// Edge length of one module in pixels. Must be at least 1.
    pub module_size_px: u32,

    /// Width of the light quiet zone around the symbol, in modules.
    pub border_modules: u32,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            version: VersionChoice::Auto,
            ec_level: EcLevel::Low,
            module_size_px: 10,
            border_modules: 4,
        }
    }
}

impl EncodingConfig {
    /// Create a config with the defaults: auto version, level L, 10 px modules, 4 module border.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the version choice.
    pub fn with_version(mut self, version: VersionChoice) -> Self {
        self.version = version;
        self
    }

    /// Builder: set the error correction level.
    pub fn with_ec_level(mut self, ec_level: EcLevel) -> Self {
        self.ec_level = ec_level;
        self
    }

    /// Builder: set the module size in pixels.
    pub fn with_module_size(mut self, px: u32) -> Self {
        self.module_size_px = px;
        self
    }

    /// Builder: set the quiet zone width in modules.
    pub fn with_border_modules(mut self, modules: u32) -> Self {
        self.border_modules = modules;
        self
    }

    /// Checks the rendering parameters.
    ///
    /// # Errors
    ///
    /// Returns [`QrError::InvalidConfig`] for a zero module size or a border
    /// wider than [`MAX_BORDER_MODULES`].
    pub fn validate(&self) -> Result<()> {
        if self.module_size_px < 1 {
            return Err(QrError::InvalidConfig(
                "module size must be at least 1 pixel".to_string(),
            ));
        }
        if self.border_modules > MAX_BORDER_MODULES {
            return Err(QrError::InvalidConfig(format!(
                "border of {} modules exceeds the maximum of {MAX_BORDER_MODULES}",
                self.border_modules
            )));
        }
        Ok(())
    }
}

/// Foreground (dark module) and background (light module) colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Colors {
    pub foreground: Rgb<u8>,
    pub background: Rgb<u8>,
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            foreground: Rgb([0, 0, 0]),
            background: Rgb([255, 255, 255]),
        }
    }
}

impl Colors {
    pub fn new(foreground: Rgb<u8>, background: Rgb<u8>) -> Self {
        Self {
            foreground,
            background,
        }
    }
}

/// Parses a `#RRGGBB` (or `RRGGBB`) hex color.
///
/// # Errors
///
/// Returns [`QrError::InvalidConfig`] if the string is not six hex digits.
///
/// # Example
///
/// ```rust
/// use image::Rgb;
/// use qrsnap::config::parse_hex_color;
///
/// assert_eq!(parse_hex_color("#FFA500").unwrap(), Rgb([255, 165, 0]));
/// ```
pub fn parse_hex_color(s: &str) -> Result<Rgb<u8>> {
    let hex = s.trim().trim_start_matches('#');
    let invalid = || QrError::InvalidConfig(format!("invalid color '{s}', expected #RRGGBB"));
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
    Ok(Rgb([channel(0)?, channel(2)?, channel(4)?]))
}
