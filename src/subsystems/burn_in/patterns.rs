//! Burn-in test patterns
//!
//! Each pattern is a pair of bytes: one for even addresses, one for odd.

/// Byte pair written over the whole flash in one pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TestPattern {
    /// Byte at even addresses
    pub even: u8,
    /// Byte at odd addresses
    pub odd: u8,
}

/// Patterns in the order they are written each cycle
pub const PATTERNS: [TestPattern; 5] = [
    TestPattern::new(0x00, 0x00),
    TestPattern::new(0x55, 0x55),
    TestPattern::new(0xAA, 0xAA),
    TestPattern::new(0x55, 0xAA),
    TestPattern::new(0xAA, 0x55),
];

impl TestPattern {
    /// Create a pattern from its even and odd bytes
    pub const fn new(even: u8, odd: u8) -> Self {
        Self { even, odd }
    }

    /// Expected byte at flash `address`
    pub const fn byte_at(&self, address: u32) -> u8 {
        if address % 2 == 0 {
            self.even
        } else {
            self.odd
        }
    }

    /// Fill `buf` as if it started at an even address
    pub fn fill(&self, buf: &mut [u8]) {
        for (i, byte) in buf.iter_mut().enumerate() {
            *byte = if i % 2 == 0 { self.even } else { self.odd };
        }
    }

    /// Count bytes of `bytes`, read from `address`, that differ from the pattern
    pub fn mismatches(&self, address: u32, bytes: &[u8]) -> u32 {
        bytes
            .iter()
            .zip(address..)
            .filter(|&(&byte, addr)| byte != self.byte_at(addr))
            .count() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_order() {
        let pairs: [(u8, u8); 5] = PATTERNS.map(|p| (p.even, p.odd));
        assert_eq!(
            pairs,
            [(0x00, 0x00), (0x55, 0x55), (0xAA, 0xAA), (0x55, 0xAA), (0xAA, 0x55)]
        );
    }

    #[test]
    fn test_fill_alternates() {
        let mut buf = [0u8; 6];
        PATTERNS[3].fill(&mut buf);
        assert_eq!(buf, [0x55, 0xAA, 0x55, 0xAA, 0x55, 0xAA]);
    }

    #[test]
    fn test_mismatches_respect_parity() {
        let pattern = PATTERNS[4];
        // Starting at an odd address the first byte expects 0x55
        assert_eq!(pattern.mismatches(0x101, &[0x55, 0xAA, 0x55]), 0);
        assert_eq!(pattern.mismatches(0x100, &[0x55, 0xAA, 0x55]), 3);
        assert_eq!(pattern.mismatches(0x100, &[0xAA, 0x54]), 1);
    }
}
