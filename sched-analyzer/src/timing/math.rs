/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Integer helpers: GCD, checked LCM and ceiling division.

use super::HyperperiodError;

/// Iterative Euclidean GCD.  `gcd(0, x) == x`.
pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

/// Checked LCM: returns `Err(HyperperiodError::Overflow { a, b })` if the
/// result would overflow `u64`.
///
/// Divides before multiplying, `(a / gcd(a, b)) * b`, and checks the final
/// multiplication.  Returns `Ok(0)` when either input is `0`.
pub fn lcm(a: u64, b: u64) -> Result<u64, HyperperiodError> {
    if a == 0 || b == 0 {
        return Ok(0);
    }

    let reduced = a / gcd(a, b);

    reduced
        .checked_mul(b)
        .ok_or(HyperperiodError::Overflow { a, b })
}

/// Fold [`lcm`] over `periods`, starting from the multiplicative identity.
///
/// Returns:
/// * `Ok(1)` for an empty slice.
/// * `Err` on the first overflow encountered.
pub fn lcm_of_slice(periods: &[u64]) -> Result<u64, HyperperiodError> {
    periods.iter().try_fold(1, |acc, &p| lcm(acc, p))
}

/// `⌈a / b⌉` for `b > 0`.
pub fn div_ceil(a: u64, b: u64) -> u64 {
    a / b + u64::from(a % b != 0)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── gcd ───────────────────────────────────────────────────────────────────

    #[test]
    fn gcd_basic_cases() {
        assert_eq!(gcd(12, 8), 4);
        assert_eq!(gcd(7, 3), 1);
        assert_eq!(gcd(100, 25), 25);
    }

    #[test]
    fn gcd_with_zero() {
        assert_eq!(gcd(0, 5), 5);
        assert_eq!(gcd(5, 0), 5);
        assert_eq!(gcd(0, 0), 0);
    }

    // ── lcm ───────────────────────────────────────────────────────────────────

    #[test]
    fn lcm_basic_cases() {
        assert_eq!(lcm(4, 6).unwrap(), 12);
        assert_eq!(lcm(3, 5).unwrap(), 15);
        assert_eq!(lcm(12, 18).unwrap(), 36);
        assert_eq!(lcm(7, 7).unwrap(), 7);
    }

    #[test]
    fn lcm_overflow_returns_error() {
        let a = u64::MAX / 2 + 1;
        let b = u64::MAX / 2 + 3;
        assert!(matches!(lcm(a, b), Err(HyperperiodError::Overflow { .. })));
    }

    // ── lcm_of_slice ──────────────────────────────────────────────────────────

    #[test]
    fn lcm_of_slice_empty_is_identity() {
        assert_eq!(lcm_of_slice(&[]).unwrap(), 1);
    }

    #[test]
    fn lcm_of_slice_classic_example_periods() {
        // 60, 50, 20, 20, 5, 10 → 300
        assert_eq!(lcm_of_slice(&[60, 50, 20, 20, 5, 10]).unwrap(), 300);
    }

    #[test]
    fn lcm_of_slice_propagates_overflow_error() {
        let huge = u64::MAX / 2 + 1;
        assert!(lcm_of_slice(&[huge, huge - 1]).is_err());
    }

    // ── div_ceil ──────────────────────────────────────────────────────────────

    #[test]
    fn div_ceil_rounds_up_only_on_remainder() {
        assert_eq!(div_ceil(0, 4), 0);
        assert_eq!(div_ceil(1, 4), 1);
        assert_eq!(div_ceil(4, 4), 1);
        assert_eq!(div_ceil(5, 4), 2);
    }
}
