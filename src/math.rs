//! Pure fee math: extracted for Kani formal verification.
//!
//! No Solana/Pubkey dependencies. Just arithmetic.
//! Kani can verify these functions exhaustively.

/// Basis-point denominator (1 bps = 1/10_000).
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Calculate the unstakeable part of a stake.
///
/// # Arguments
/// * `amount` - Tokens being staked
/// * `unstakeable_fee_bps` - Share of the stake that stays withdrawable, in bps
///
/// # Returns
/// * `Some(unstakeable)` - `amount * bps / 10_000`, rounded DOWN (store-favoring)
/// * `None` - bps above 10_000
///
/// # Invariant
/// Result never exceeds `amount`.
pub fn calc_unstakeable(amount: u64, unstakeable_fee_bps: u16) -> Option<u64> {
    if unstakeable_fee_bps as u64 > BPS_DENOMINATOR {
        return None;
    }
    // u128 intermediate: amount * bps can exceed u64 for large stakes
    let unstakeable = (amount as u128)
        .checked_mul(unstakeable_fee_bps as u128)?
        .checked_div(BPS_DENOMINATOR as u128)?;
    u64::try_from(unstakeable).ok()
}

/// Portion of a stake retained by the store (never withdrawable).
///
/// `retained = amount - calc_unstakeable(amount)`
pub fn calc_retained(amount: u64, unstakeable_fee_bps: u16) -> Option<u64> {
    amount.checked_sub(calc_unstakeable(amount, unstakeable_fee_bps)?)
}

/// Minimum gate: a stake must be strictly greater than the configured minimum.
pub fn exceeds_minimum(amount: u64, min_contribution: u64) -> bool {
    amount > min_contribution
}

/// Tokens still owed to stakers by the store.
///
/// `outstanding = total_unstakeable_credited - total_released`
pub fn store_outstanding(total_credited: u64, total_released: u64) -> Option<u64> {
    total_credited.checked_sub(total_released)
}
