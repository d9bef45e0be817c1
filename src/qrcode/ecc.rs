//! Reed-Solomon error correction and codeword capacity tables.

use super::{EcLevel, Version};

/// Reed-Solomon ECC generator over GF(2^8/0x11D) for one block length.
pub(crate) struct ReedSolomonGenerator {
    divisor: Vec<u8>,
}

impl ReedSolomonGenerator {
    /// Creates a generator producing `degree` ECC codewords per block.
    pub fn new(degree: usize) -> Self {
        debug_assert!((1..=255).contains(&degree), "Degree out of range");
        // Coefficients from highest to lowest power, leading 1 omitted
        let mut divisor = vec![0u8; degree - 1];
        divisor.push(1);
        let mut root: u8 = 1;
        for _ in 0..degree {
            for j in 0..degree {
                divisor[j] = Self::multiply(divisor[j], root);
                if j + 1 < divisor.len() {
                    divisor[j] ^= divisor[j + 1];
                }
            }
            root = Self::multiply(root, 0x02);
        }
        Self { divisor }
    }

    /// Returns the ECC codewords for the given data block.
    pub fn compute_remainder(&self, data: &[u8]) -> Vec<u8> {
        let mut result = vec![0u8; self.divisor.len()];
        for &b in data {
            let factor: u8 = b ^ result[0];
            result.copy_within(1.., 0);
            let last = result.len() - 1;
            result[last] = 0;
            for (x, &y) in result.iter_mut().zip(self.divisor.iter()) {
                *x ^= Self::multiply(y, factor);
            }
        }
        result
    }

    /// Russian peasant multiplication in GF(2^8) modulo x^8 + x^4 + x^3 + x^2 + 1.
    fn multiply(x: u8, y: u8) -> u8 {
        let mut z: u8 = 0;
        for i in (0..8).rev() {
            z = (z << 1) ^ ((z >> 7) * 0x1d);
            z ^= ((y >> i) & 1) * x;
        }
        z
    }
}

/// Splits the data codewords into blocks, appends ECC to each and interleaves
/// them into the final codeword sequence.
pub(crate) fn add_ecc_and_interleave(data: &[u8], ver: Version, ecl: EcLevel) -> Vec<u8> {
    debug_assert_eq!(data.len(), num_data_codewords(ver, ecl));
    let numblocks = table_get(&NUM_ERROR_CORRECTION_BLOCKS, ver, ecl);
    let blockecclen = table_get(&ECC_CODEWORDS_PER_BLOCK, ver, ecl);
    let rawcodewords = num_raw_data_modules(ver) / 8;
    let numshortblocks = numblocks - rawcodewords % numblocks;
    let shortblocklen = rawcodewords / numblocks;
    let shortdatalen = shortblocklen - blockecclen;

    let rs = ReedSolomonGenerator::new(blockecclen);
    let mut blocks: Vec<Vec<u8>> = Vec::with_capacity(numblocks);
    let mut rest = data;
    for i in 0..numblocks {
        let datlen = shortdatalen + usize::from(i >= numshortblocks);
        let (dat, tail) = rest.split_at(datlen);
        rest = tail;
        let ecc = rs.compute_remainder(dat);
        let mut block = dat.to_vec();
        if i < numshortblocks {
            // Placeholder so every block has the same length; skipped below
            block.push(0);
        }
        block.extend_from_slice(&ecc);
        blocks.push(block);
    }
    debug_assert!(rest.is_empty());

    let mut result = Vec::with_capacity(rawcodewords);
    for i in 0..=shortblocklen {
        for (j, block) in blocks.iter().enumerate() {
            if i != shortdatalen || j >= numshortblocks {
                result.push(block[i]);
            }
        }
    }
    debug_assert_eq!(result.len(), rawcodewords);
    result
}

/// Number of modules available for data and ECC bits at `ver`, after all
/// function patterns are excluded. May not be a multiple of 8.
pub(crate) fn num_raw_data_modules(ver: Version) -> usize {
    let ver = usize::from(ver.value());
    let mut result: usize = (16 * ver + 128) * ver + 64;
    if ver >= 2 {
        let numalign: usize = ver / 7 + 2;
        result -= (25 * numalign - 10) * numalign - 55;
        if ver >= 7 {
            result -= 36;
        }
    }
    result
}

/// Number of 8-bit data codewords (excluding ECC) at the given version and level.
pub(crate) fn num_data_codewords(ver: Version, ecl: EcLevel) -> usize {
    num_raw_data_modules(ver) / 8
        - table_get(&ECC_CODEWORDS_PER_BLOCK, ver, ecl)
            * table_get(&NUM_ERROR_CORRECTION_BLOCKS, ver, ecl)
}

fn table_get(table: &'static [[i16; 41]; 4], ver: Version, ecl: EcLevel) -> usize {
    table[ecl.ordinal()][usize::from(ver.value())] as usize
}

static ECC_CODEWORDS_PER_BLOCK: [[i16; 41]; 4] = [
    [
        -1, 7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28, 30,
        30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Low
    [
        -1, 10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28, 28,
        28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28,
    ], // Medium
    [
        -1, 13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30, 30,
        30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Quartile
    [
        -1, 17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24, 30,
        30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // High
];

static NUM_ERROR_CORRECTION_BLOCKS: [[i16; 41]; 4] = [
    [
        -1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 4, 4, 4, 4, 4, 6, 6, 6, 6, 7, 8, 8, 9, 9, 10, 12, 12, 12,
        13, 14, 15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25,
    ], // Low
    [
        -1, 1, 1, 1, 2, 2, 4, 4, 4, 5, 5, 5, 8, 9, 9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21,
        23, 25, 26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49,
    ], // Medium
    [
        -1, 1, 1, 2, 2, 4, 4, 6, 6, 8, 8, 8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27, 29,
        34, 34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68,
    ], // Quartile
    [
        -1, 1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32, 35,
        37, 40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81,
    ], // High
];
