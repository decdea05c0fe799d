// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Domain price table, in USDC.

use super::derive::SOL_SUFFIX;

/// Largest accepted difference between a quoted and the expected price.
pub const PRICE_TOLERANCE_USDC: f64 = 0.01;

/// Price of a domain by the character length of its name, suffix excluded.
///
/// | length | price |
/// |--------|-------|
/// | 1–3    | 10.0  |
/// | 4–5    | 5.0   |
/// | 6–8    | 2.0   |
/// | 9+     | 1.0   |
pub fn domain_price_usdc(name: &str) -> f64 {
    let stem = name.strip_suffix(SOL_SUFFIX).unwrap_or(name);
    match stem.chars().count() {
        0..=3 => 10.0,
        4..=5 => 5.0,
        6..=8 => 2.0,
        _ => 1.0,
    }
}

/// Whether `quoted` is within [`PRICE_TOLERANCE_USDC`] of the price of `name`.
pub fn price_matches(name: &str, quoted: f64) -> bool {
    quoted.is_finite() && (quoted - domain_price_usdc(name)).abs() <= PRICE_TOLERANCE_USDC
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets() {
        assert_eq!(domain_price_usdc("a.sol"), 10.0);
        assert_eq!(domain_price_usdc("abcd.sol"), 5.0);
        assert_eq!(domain_price_usdc("abcdefg.sol"), 2.0);
        assert_eq!(domain_price_usdc("abcdefghijkl.sol"), 1.0);
    }

    #[test]
    fn bucket_boundaries() {
        assert_eq!(domain_price_usdc("abc.sol"), 10.0);
        assert_eq!(domain_price_usdc("abcd.sol"), 5.0);
        assert_eq!(domain_price_usdc("abcde.sol"), 5.0);
        assert_eq!(domain_price_usdc("abcdef.sol"), 2.0);
        assert_eq!(domain_price_usdc("abcdefgh.sol"), 2.0);
        assert_eq!(domain_price_usdc("abcdefghi.sol"), 1.0);
    }

    #[test]
    fn counts_characters_not_bytes() {
        assert_eq!(domain_price_usdc("ñañ.sol"), 10.0);
    }

    #[test]
    fn tolerance() {
        assert!(price_matches("abc.sol", 10.0));
        assert!(price_matches("abc.sol", 10.005));
        assert!(!price_matches("abc.sol", 10.02));
        assert!(!price_matches("abc.sol", 9.98));
        assert!(!price_matches("abc.sol", f64::NAN));
    }
}
