use alloy_primitives::U256;

/// Upper bound accepted from config (10%).
pub const MAX_SLIPPAGE_BPS: u32 = 1_000;

const BPS_DENOMINATOR: u64 = 10_000;

/// `amount - amount * bps / 10_000`, rounding the deduction down.
pub fn apply_slippage(amount: U256, bps: u32) -> U256 {
    let bps = U256::from(bps.min(BPS_DENOMINATOR as u32));
    let denom = U256::from(BPS_DENOMINATOR);
    let cut = match amount.checked_mul(bps) {
        Some(scaled) => scaled / denom,
        // too large to scale first; divide first and accept the rounding
        None => amount / denom * bps,
    };
    amount - cut
}

/// Unix deadline `secs` after `now`.
pub fn deadline(now_unix: u64, secs: u64) -> U256 {
    U256::from(now_unix.saturating_add(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_percent() {
        assert_eq!(apply_slippage(U256::from(1_000_000u64), 50), U256::from(995_000u64));
    }

    #[test]
    fn test_rounds_deduction_down() {
        // 199 * 50 / 10000 = 0.995 -> 0
        assert_eq!(apply_slippage(U256::from(199u64), 50), U256::from(199u64));
        assert_eq!(apply_slippage(U256::from(200u64), 50), U256::from(199u64));
    }

    #[test]
    fn test_zero_and_full() {
        assert_eq!(apply_slippage(U256::ZERO, 50), U256::ZERO);
        assert_eq!(apply_slippage(U256::from(42u64), 0), U256::from(42u64));
        assert_eq!(apply_slippage(U256::from(42u64), 20_000), U256::ZERO);
    }

    #[test]
    fn test_no_overflow_at_max() {
        let out = apply_slippage(U256::MAX, 50);
        assert!(out < U256::MAX);
        assert!(out > U256::MAX / U256::from(2u64));
    }

    #[test]
    fn test_deadline() {
        assert_eq!(deadline(1_700_000_000, 600), U256::from(1_700_000_600u64));
        assert_eq!(deadline(u64::MAX, 600), U256::from(u64::MAX));
    }
}
