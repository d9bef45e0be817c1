//! Byte-mode data segment and the padded data codeword stream.

use super::{ecc, EcLevel, Version};

/// Mode indicator for 8-bit byte data.
const MODE_BYTE: u32 = 0x4;

/// Alternating pad codewords that fill the unused data capacity.
const PAD_BYTES: [u32; 2] = [0xEC, 0x11];

/// An appendable sequence of bits, packed big-endian into bytes.
pub(crate) struct BitBuffer {
    data: Vec<u8>,
    length: usize,
}

impl BitBuffer {
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            data: Vec::with_capacity(bytes),
            length: 0,
        }
    }

    /// Number of bits appended so far.
    pub fn len(&self) -> usize {
        self.length
    }

    /// Appends the low `len` bits of `val`, most significant bit first.
    pub fn append_bits(&mut self, val: u32, len: u8) {
        debug_assert!(len <= 31 && (val >> len) == 0, "value does not fit in {len} bits");
        for i in (0..len).rev() {
            let shift = 7 - (self.length & 7);
            if shift == 7 {
                self.data.push(0);
            }
            let bit = ((val >> i) & 1) as u8;
            self.data[self.length >> 3] |= bit << shift;
            self.length += 1;
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// Width of the character count field for a byte segment at `version`.
pub(crate) fn char_count_bits(version: Version) -> u8 {
    [8, 16, 16][usize::from((version.value() + 7) / 17)]
}

/// Total bits used by a byte segment of `len` bytes at `version`, or `None`
/// when the length cannot be expressed in the character count field.
pub(crate) fn segment_bits(len: usize, version: Version) -> Option<usize> {
    let ccbits = char_count_bits(version);
    if len >= 1usize << ccbits {
        return None;
    }
    len.checked_mul(8)?.checked_add(4 + usize::from(ccbits))
}

/// Builds the full data codeword sequence for `data` at the given version and
/// level: segment header, payload, terminator, byte alignment and padding.
///
/// The caller must have checked that the data fits.
pub(crate) fn data_codewords(data: &[u8], version: Version, ecl: EcLevel) -> Vec<u8> {
    let capacitybits = ecc::num_data_codewords(version, ecl) * 8;
    let mut bb = BitBuffer::with_capacity(capacitybits / 8);

    bb.append_bits(MODE_BYTE, 4);
    bb.append_bits(data.len() as u32, char_count_bits(version));
    for &byte in data {
        bb.append_bits(u32::from(byte), 8);
    }
    debug_assert!(bb.len() <= capacitybits);

    // Terminator, then pad up to a byte boundary
    let numzerobits = (capacitybits - bb.len()).min(4);
    bb.append_bits(0, numzerobits as u8);
    let numzerobits = bb.len().wrapping_neg() & 7;
    bb.append_bits(0, numzerobits as u8);
    debug_assert_eq!(bb.len() % 8, 0);

    for &padbyte in PAD_BYTES.iter().cycle() {
        if bb.len() >= capacitybits {
            break;
        }
        bb.append_bits(padbyte, 8);
    }
    bb.into_bytes()
}
