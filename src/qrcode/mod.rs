//! QR code encoding.
//!
//! This module turns text into a [`SymbolMatrix`] following the QR Code Model 2
//! specification: byte-mode data, Reed-Solomon error correction, module
//! placement, penalty-driven mask selection and a quiet zone. Versions 1 to 40
//! and all four error correction levels are supported.

mod bits;
mod ecc;
mod mask;

use core::fmt;
use core::str::FromStr;

use tracing::debug;

use crate::config::EncodingConfig;
use crate::error::{QrError, Result};

pub use mask::Mask;

/// Encodes `text` as a single byte-mode segment (its UTF-8 bytes, verbatim).
///
/// In [`VersionChoice::Auto`] mode the smallest version that holds the data at
/// the requested error correction level is used. All eight masks are scored
/// and the one with the lowest penalty wins, ties going to the lowest index.
///
/// # Errors
///
/// - [`QrError::InvalidInput`] if `text` is empty or whitespace only.
/// - [`QrError::CapacityExceeded`] if a fixed version is too small, or if the
///   text does not fit even in version 40.
/// - [`QrError::InvalidConfig`] if [`EncodingConfig::validate`] rejects `config`.
///
/// # Example
///
/// ```rust
/// use qrsnap::config::EncodingConfig;
/// use qrsnap::qrcode::{encode, EcLevel};
///
/// let config = EncodingConfig::default().with_ec_level(EcLevel::Medium);
/// let matrix = encode("Hello, World!", &config).unwrap();
///
/// assert_eq!(matrix.version().value(), 1);
/// assert_eq!(matrix.side_len(), 21 + 2 * 4);
/// ```
pub fn encode(text: &str, config: &EncodingConfig) -> Result<SymbolMatrix> {
    if text.trim().is_empty() {
        return Err(QrError::InvalidInput);
    }
    config.validate()?;
    let data = text.as_bytes();
    let ecl = config.ec_level;

    let version = match config.version {
        VersionChoice::Fixed(version) => {
            if !fits(data.len(), version, ecl) {
                return Err(capacity_exceeded(data.len(), version, ecl));
            }
            version
        }
        VersionChoice::Auto => (Version::MIN.value()..=Version::MAX.value())
            .map(Version)
            .find(|&version| fits(data.len(), version, ecl))
            .ok_or_else(|| capacity_exceeded(data.len(), Version::MAX, ecl))?,
    };

    let datacodewords = bits::data_codewords(data, version, ecl);
    let allcodewords = ecc::add_ecc_and_interleave(&datacodewords, version, ecl);

    let mut canvas = Canvas::new(version);
    canvas.draw_function_patterns();
    canvas.draw_codewords(&allcodewords);
    let mask = canvas.select_mask(ecl);
    canvas.apply_mask(mask);
    canvas.draw_format_bits(ecl, mask);

    debug!(
        bytes = data.len(),
        version = version.value(),
        ec_level = %ecl,
        mask = mask.value(),
        "Encoded QR symbol"
    );
    Ok(canvas.into_matrix(ecl, mask, config.border_modules as usize))
}

/// Maximum number of bytes a byte-mode segment can carry at the given
/// version and error correction level.
pub fn byte_capacity(version: Version, ecl: EcLevel) -> usize {
    let capacitybits = ecc::num_data_codewords(version, ecl) * 8;
    let ccbits = bits::char_count_bits(version);
    let fitting = (capacitybits - 4 - usize::from(ccbits)) / 8;
    fitting.min((1usize << ccbits) - 1)
}

fn fits(len: usize, version: Version, ecl: EcLevel) -> bool {
    bits::segment_bits(len, version)
        .is_some_and(|used| used <= ecc::num_data_codewords(version, ecl) * 8)
}

fn capacity_exceeded(len: usize, version: Version, ecl: EcLevel) -> QrError {
    QrError::CapacityExceeded {
        len,
        capacity: byte_capacity(version, ecl),
        version: version.value(),
        ec_level: ecl,
    }
}

/// A finished QR symbol including its quiet zone: a square grid of dark
/// (`true`) and light (`false`) modules. Immutable once produced.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SymbolMatrix {
    version: Version,
    ec_level: EcLevel,
    mask: Mask,
    border: usize,
    side: usize,
    modules: Vec<bool>,
}

impl SymbolMatrix {
    /// Width and height in modules: `17 + 4 * version + 2 * border`.
    pub fn side_len(&self) -> usize {
        self.side
    }

    /// Width and height of the symbol without its quiet zone, between 21 and 177.
    pub fn symbol_size(&self) -> usize {
        self.version.size()
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn ec_level(&self) -> EcLevel {
        self.ec_level
    }

    /// The mask pattern that was selected for this symbol.
    pub fn mask(&self) -> Mask {
        self.mask
    }

    /// Width of the light quiet zone, in modules.
    pub fn border(&self) -> usize {
        self.border
    }

    /// Returns `true` for a dark module. Coordinates outside the matrix are light.
    ///
    /// # Arguments
    ///
    /// * `x` - Column, 0 is left.
    /// * `y` - Row, 0 is top.
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.side && y < self.side && self.modules[y * self.side + x]
    }

    /// All modules in row-major order.
    pub fn modules(&self) -> &[bool] {
        &self.modules
    }

    /// Iterates over the rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> + '_ {
        self.modules.chunks(self.side)
    }
}

/// Working grid for one symbol, without quiet zone. Tracks which modules
/// belong to function patterns so data and masks leave them alone.
struct Canvas {
    version: Version,
    size: usize,
    modules: Vec<bool>,
    isfunction: Vec<bool>,
}

impl Canvas {
    fn new(version: Version) -> Self {
        let size = version.size();
        Self {
            version,
            size,
            modules: vec![false; size * size],
            isfunction: vec![false; size * size],
        }
    }

    fn get(&self, x: usize, y: usize) -> bool {
        self.modules[y * self.size + x]
    }

    fn set(&mut self, x: usize, y: usize, isdark: bool) {
        self.modules[y * self.size + x] = isdark;
    }

    fn set_function(&mut self, x: usize, y: usize, isdark: bool) {
        self.set(x, y, isdark);
        self.isfunction[y * self.size + x] = true;
    }

    /// Sets a function module, silently ignoring coordinates outside the grid.
    fn set_function_unbounded(&mut self, x: i32, y: i32, isdark: bool) {
        let range = 0..self.size as i32;
        if range.contains(&x) && range.contains(&y) {
            self.set_function(x as usize, y as usize, isdark);
        }
    }

    fn draw_function_patterns(&mut self) {
        let size = self.size;

        // Timing patterns
        for i in 0..size {
            self.set_function(6, i, i % 2 == 0);
            self.set_function(i, 6, i % 2 == 0);
        }

        // Finder patterns with their separators
        let far = size as i32 - 4;
        self.draw_finder_pattern(3, 3);
        self.draw_finder_pattern(far, 3);
        self.draw_finder_pattern(3, far);

        // Alignment patterns, except where they would overlap the finders
        let alignpatpos = alignment_pattern_positions(self.version);
        let last = alignpatpos.len().saturating_sub(1);
        for (i, &pos0) in alignpatpos.iter().enumerate() {
            for (j, &pos1) in alignpatpos.iter().enumerate() {
                let overlaps_finder =
                    (i == 0 && j == 0) || (i == 0 && j == last) || (i == last && j == 0);
                if !overlaps_finder {
                    self.draw_alignment_pattern(pos0, pos1);
                }
            }
        }

        // Reserve the format area; real bits are drawn once the mask is known
        self.draw_format_bits(EcLevel::Low, Mask::ALL[0]);
        self.draw_version();
    }

    fn draw_finder_pattern(&mut self, x: i32, y: i32) {
        for dy in -4i32..=4 {
            for dx in -4i32..=4 {
                let dist = dx.abs().max(dy.abs());
                self.set_function_unbounded(x + dx, y + dy, dist != 2 && dist != 4);
            }
        }
    }

    fn draw_alignment_pattern(&mut self, x: usize, y: usize) {
        for dy in 0usize..5 {
            for dx in 0usize..5 {
                let dist = dx.abs_diff(2).max(dy.abs_diff(2));
                self.set_function(x + dx - 2, y + dy - 2, dist != 1);
            }
        }
    }

    /// Draws both copies of the 15-bit format information.
    fn draw_format_bits(&mut self, ecl: EcLevel, mask: Mask) {
        let bits: u32 = {
            let data = u32::from((ecl.format_bits() << 3) | mask.value());
            let mut rem: u32 = data;
            for _ in 0..10 {
                rem = (rem << 1) ^ ((rem >> 9) * 0x537);
            }
            ((data << 10) | rem) ^ 0x5412
        };
        debug_assert_eq!(bits >> 15, 0);

        // First copy, around the top left finder
        for i in 0..6 {
            self.set_function(8, usize::from(i), get_bit(bits, i));
        }
        self.set_function(8, 7, get_bit(bits, 6));
        self.set_function(8, 8, get_bit(bits, 7));
        self.set_function(7, 8, get_bit(bits, 8));
        for i in 9..15 {
            self.set_function(usize::from(14 - i), 8, get_bit(bits, i));
        }

        // Second copy, split between the other two finders
        let size = self.size;
        for i in 0..8 {
            self.set_function(size - 1 - usize::from(i), 8, get_bit(bits, i));
        }
        for i in 8..15 {
            self.set_function(8, size - 15 + usize::from(i), get_bit(bits, i));
        }
        self.set_function(8, size - 8, true); // Always dark
    }

    /// Draws both copies of the version information, for version 7 and up.
    fn draw_version(&mut self) {
        let ver = u32::from(self.version.value());
        if ver < 7 {
            return;
        }
        let bits: u32 = {
            let mut rem: u32 = ver;
            for _ in 0..12 {
                rem = (rem << 1) ^ ((rem >> 11) * 0x1f25);
            }
            (ver << 12) | rem
        };
        debug_assert_eq!(bits >> 18, 0);

        for i in 0u8..18 {
            let bit = get_bit(bits, i);
            let a = self.size - 11 + usize::from(i % 3);
            let b = usize::from(i / 3);
            self.set_function(a, b, bit);
            self.set_function(b, a, bit);
        }
    }

    /// Places the interleaved codewords in the zig-zag order, two columns at a
    /// time from the bottom right, skipping function modules.
    fn draw_codewords(&mut self, data: &[u8]) {
        debug_assert_eq!(data.len(), ecc::num_raw_data_modules(self.version) / 8);
        let size = self.size;
        let totalbits = data.len() * 8;
        let mut i: usize = 0;
        let mut right: usize = size - 1;
        loop {
            if right == 6 {
                // Skip the vertical timing pattern
                right = 5;
            }
            let upward = ((right + 1) & 2) == 0;
            for vert in 0..size {
                let y = if upward { size - 1 - vert } else { vert };
                for x in [right, right - 1] {
                    if !self.isfunction[y * size + x] && i < totalbits {
                        self.set(x, y, get_bit(u32::from(data[i >> 3]), 7 - (i & 7) as u8));
                        i += 1;
                    }
                }
            }
            if right < 3 {
                break;
            }
            right -= 2;
        }
        debug_assert_eq!(i, totalbits);
    }

    /// XORs the mask onto every non-function module. Applying the same mask
    /// twice restores the original grid.
    fn apply_mask(&mut self, mask: Mask) {
        for y in 0..self.size {
            for x in 0..self.size {
                let index = y * self.size + x;
                if !self.isfunction[index] && mask.inverts(x, y) {
                    self.modules[index] = !self.modules[index];
                }
            }
        }
    }

    /// Penalty of each mask, in index order, with its format bits drawn.
    fn mask_penalties(&mut self, ecl: EcLevel) -> [i32; 8] {
        let mut penalties = [0; 8];
        for (slot, mask) in penalties.iter_mut().zip(Mask::ALL) {
            self.apply_mask(mask);
            self.draw_format_bits(ecl, mask);
            *slot = mask::penalty_score(&self.modules, self.size);
            self.apply_mask(mask);
        }
        penalties
    }

    fn select_mask(&mut self, ecl: EcLevel) -> Mask {
        let penalties = self.mask_penalties(ecl);
        let mask = lowest_penalty(&penalties);
        debug!(?penalties, mask = mask.value(), "Selected mask");
        mask
    }

    /// Wraps the symbol in a light quiet zone of `border` modules.
    fn into_matrix(self, ecl: EcLevel, mask: Mask, border: usize) -> SymbolMatrix {
        let side = self.size + 2 * border;
        let mut modules = vec![false; side * side];
        for y in 0..self.size {
            for x in 0..self.size {
                modules[(y + border) * side + x + border] = self.get(x, y);
            }
        }
        SymbolMatrix {
            version: self.version,
            ec_level: ecl,
            mask,
            border,
            side,
            modules,
        }
    }
}

/// The mask with the smallest penalty; the lowest index wins a tie.
fn lowest_penalty(penalties: &[i32; 8]) -> Mask {
    let mut best = 0;
    for (i, &penalty) in penalties.iter().enumerate() {
        if penalty < penalties[best] {
            best = i;
        }
    }
    Mask::ALL[best]
}

/// Ascending centre positions of the alignment patterns on each axis.
/// Empty for version 1.
fn alignment_pattern_positions(version: Version) -> Vec<usize> {
    let ver = usize::from(version.value());
    if ver == 1 {
        return Vec::new();
    }
    let numalign = ver / 7 + 2;
    let step = if ver == 32 {
        26
    } else {
        (ver * 4 + numalign * 2 + 1) / (numalign * 2 - 2) * 2
    };
    let size = version.size();
    let mut result: Vec<usize> = (0..numalign - 1).map(|i| size - 7 - i * step).collect();
    result.push(6);
    result.reverse();
    result
}

fn get_bit(x: u32, i: u8) -> bool {
    ((x >> i) & 1) != 0
}

/// Error correction level for a QR code.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub enum EcLevel {
    /// Tolerates ~7% erroneous codewords.
    #[default]
    Low,
    /// Tolerates ~15% erroneous codewords.
    Medium,
    /// Tolerates ~25% erroneous codewords.
    Quartile,
    /// Tolerates ~30% erroneous codewords.
    High,
}

impl EcLevel {
    pub const ALL: [EcLevel; 4] = [EcLevel::Low, EcLevel::Medium, EcLevel::Quartile, EcLevel::High];

    /// Index into the per-level tables (0 to 3).
    fn ordinal(self) -> usize {
        match self {
            EcLevel::Low => 0,
            EcLevel::Medium => 1,
            EcLevel::Quartile => 2,
            EcLevel::High => 3,
        }
    }

    /// The 2-bit value stored in the format information.
    fn format_bits(self) -> u8 {
        match self {
            EcLevel::Low => 1,
            EcLevel::Medium => 0,
            EcLevel::Quartile => 3,
            EcLevel::High => 2,
        }
    }
}

impl fmt::Display for EcLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            EcLevel::Low => "L",
            EcLevel::Medium => "M",
            EcLevel::Quartile => "Q",
            EcLevel::High => "H",
        };
        f.write_str(letter)
    }
}

impl FromStr for EcLevel {
    type Err = QrError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "l" | "low" => Ok(EcLevel::Low),
            "m" | "medium" => Ok(EcLevel::Medium),
            "q" | "quartile" => Ok(EcLevel::Quartile),
            "h" | "high" => Ok(EcLevel::High),
            _ => Err(QrError::InvalidConfig(format!(
                "unknown error correction level '{s}', expected one of L, M, Q, H"
            ))),
        }
    }
}

/// A QR code version (1–40).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Version(u8);

impl Version {
    /// The minimum version number supported in the QR Code Model 2 standard.
    pub const MIN: Version = Version(1);

    /// The maximum version number supported in the QR Code Model 2 standard.
    pub const MAX: Version = Version(40);

    /// Creates a version object from the given number.
    ///
    /// # Errors
    ///
    /// Returns [`QrError::InvalidConfig`] if the number is outside [1, 40].
    pub fn new(ver: u8) -> Result<Self> {
        if (Self::MIN.0..=Self::MAX.0).contains(&ver) {
            Ok(Self(ver))
        } else {
            Err(QrError::InvalidConfig(format!(
                "version must be between 1 and 40, got {ver}"
            )))
        }
    }

    /// Returns the value, which is in the range [1, 40].
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Side length of a symbol of this version, without quiet zone.
    pub const fn size(self) -> usize {
        self.0 as usize * 4 + 17
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the encoder picks a version.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum VersionChoice {
    /// The smallest version that fits the data.
    #[default]
    Auto,
    /// Exactly this version, or a capacity error.
    Fixed(Version),
}

impl fmt::Display for VersionChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionChoice::Auto => f.write_str("auto"),
            VersionChoice::Fixed(version) => write!(f, "{version}"),
        }
    }
}

impl FromStr for VersionChoice {
    type Err = QrError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(VersionChoice::Auto);
        }
        let number: u8 = s.parse().map_err(|_| {
            QrError::InvalidConfig(format!("invalid version '{s}', expected 'auto' or 1-40"))
        })?;
        Version::new(number).map(VersionChoice::Fixed)
    }
}
