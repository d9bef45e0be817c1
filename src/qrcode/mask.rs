//! Data masks and the penalty score used to pick one.

use core::fmt;

const PENALTY_N1: i32 = 3;
const PENALTY_N2: i32 = 3;
const PENALTY_N3: i32 = 40;
const PENALTY_N4: i32 = 10;

/// A mask pattern (0–7).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Mask(u8);

impl Mask {
    /// All eight patterns, in index order.
    pub const ALL: [Mask; 8] = [
        Mask(0),
        Mask(1),
        Mask(2),
        Mask(3),
        Mask(4),
        Mask(5),
        Mask(6),
        Mask(7),
    ];

    /// Returns the value, which is in the range [0, 7].
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Whether this pattern inverts the module at column `x`, row `y`.
    pub(crate) fn inverts(self, x: usize, y: usize) -> bool {
        match self.0 {
            0 => (x + y) % 2 == 0,
            1 => y % 2 == 0,
            2 => x % 3 == 0,
            3 => (x + y) % 3 == 0,
            4 => (x / 3 + y / 2) % 2 == 0,
            5 => ((x * y) % 2) + ((x * y) % 3) == 0,
            6 => (((x * y) % 2) + ((x * y) % 3)) % 2 == 0,
            _ => (((x + y) % 2) + ((x * y) % 3)) % 2 == 0,
        }
    }
}

impl fmt::Display for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Penalty score of a `size`×`size` symbol stored row-major in `modules`.
///
/// Sums the four rules: long same-color runs (N1), 2×2 blocks (N2),
/// finder-like patterns (N3) and dark/light imbalance (N4).
pub(crate) fn penalty_score(modules: &[bool], size: usize) -> i32 {
    debug_assert_eq!(modules.len(), size * size);
    let get = |x: usize, y: usize| modules[y * size + x];
    let mut result: i32 = 0;

    // Rows and columns share the same run logic
    for horizontal in [true, false] {
        for a in 0..size {
            let mut runcolor = false;
            let mut runlen: i32 = 0;
            let mut runhistory = FinderPenalty::new(size);
            for b in 0..size {
                let color = if horizontal { get(b, a) } else { get(a, b) };
                if color == runcolor {
                    runlen += 1;
                    if runlen == 5 {
                        result += PENALTY_N1;
                    } else if runlen > 5 {
                        result += 1;
                    }
                } else {
                    runhistory.add_history(runlen);
                    if !runcolor {
                        result += runhistory.count_patterns() * PENALTY_N3;
                    }
                    runcolor = color;
                    runlen = 1;
                }
            }
            result += runhistory.terminate_and_count(runcolor, runlen) * PENALTY_N3;
        }
    }

    for y in 0..size - 1 {
        for x in 0..size - 1 {
            let color = get(x, y);
            if color == get(x + 1, y) && color == get(x, y + 1) && color == get(x + 1, y + 1) {
                result += PENALTY_N2;
            }
        }
    }

    let dark = modules.iter().filter(|&&m| m).count() as i32;
    let total = (size * size) as i32;
    // Smallest k such that (45-5k)% <= dark <= (55+5k)%
    let k: i32 = ((dark * 20 - total * 10).abs() + total - 1) / total - 1;
    result += k * PENALTY_N4;
    result
}

/// Sliding history of the last seven run lengths along a row or column,
/// used to spot 1:1:3:1:1 finder-like patterns.
struct FinderPenalty {
    qr_size: i32,
    run_history: [i32; 7],
}

impl FinderPenalty {
    fn new(size: usize) -> Self {
        Self {
            qr_size: size as i32,
            run_history: [0; 7],
        }
    }

    fn add_history(&mut self, mut currentrunlength: i32) {
        if self.run_history[0] == 0 {
            // The light area outside the symbol counts towards the first run
            currentrunlength += self.qr_size;
        }
        let len = self.run_history.len();
        self.run_history.copy_within(0..len - 1, 1);
        self.run_history[0] = currentrunlength;
    }

    /// Must only be called right after a light run was added.
    fn count_patterns(&self) -> i32 {
        let rh = &self.run_history;
        let n = rh[1];
        let core = n > 0 && rh[2] == n && rh[3] == n * 3 && rh[4] == n && rh[5] == n;
        i32::from(core && rh[0] >= n * 4 && rh[6] >= n)
            + i32::from(core && rh[6] >= n * 4 && rh[0] >= n)
    }

    fn terminate_and_count(mut self, currentruncolor: bool, mut currentrunlength: i32) -> i32 {
        if currentruncolor {
            self.add_history(currentrunlength);
            currentrunlength = 0;
        }
        currentrunlength += self.qr_size;
        self.add_history(currentrunlength);
        self.count_patterns()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&str]) -> (Vec<bool>, usize) {
        let size = rows.len();
        let modules = rows
            .iter()
            .flat_map(|row| row.chars().map(|c| c == '#'))
            .collect::<Vec<_>>();
        assert_eq!(modules.len(), size * size);
        (modules, size)
    }

    #[test]
    fn test_mask_patterns_at_origin_invert() {
        for mask in Mask::ALL {
            assert!(mask.inverts(0, 0), "mask {mask} should invert (0, 0)");
        }
        assert!(!Mask(0).inverts(1, 0));
        assert!(Mask(1).inverts(1, 0));
        assert!(!Mask(2).inverts(1, 0));
        assert!(Mask(2).inverts(3, 5));
    }

    #[test]
    fn test_finder_pattern_detection() {
        // Light border, then dark 1, light 1, dark 3, light 1, dark 1, light 4
        let mut history = FinderPenalty::new(21);
        for run in [4, 1, 1, 3, 1, 1] {
            history.add_history(run);
        }
        // Light on both sides matches once per side
        assert_eq!(history.terminate_and_count(false, 4), 2);
    }

    #[test]
    fn test_finder_pattern_wrong_ratio() {
        let mut history = FinderPenalty::new(21);
        for run in [4, 1, 1, 2, 1, 1] {
            history.add_history(run);
        }
        assert_eq!(history.terminate_and_count(false, 4), 0);
    }

    #[test]
    fn test_penalty_checkerboard_has_no_runs_or_blocks() {
        let rows = ["#.#.#", ".#.#.", "#.#.#", ".#.#.", "#.#.#"];
        let (modules, size) = grid(&rows);
        // 13 dark of 25 is inside the 45-55% band
        assert_eq!(penalty_score(&modules, size), 0);
    }

    #[test]
    fn test_penalty_all_light() {
        let rows = [".....", ".....", ".....", ".....", "....."];
        let (modules, size) = grid(&rows);
        // N1: 10 runs of exactly 5 -> 30
        // N2: 16 blocks -> 48
        // N4: 0% dark -> k = 9 -> 90
        assert_eq!(penalty_score(&modules, size), 30 + 48 + 90);
    }
}
