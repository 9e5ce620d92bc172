//! Kani formal verification for staking-ledger fee math and accounting.
//!
//! ZERO dependencies. Pure Rust. CBMC-friendly.
//!
//! Functions use u32 inputs / u64 intermediates. The production code uses
//! u64/u128; the properties (bounds, conservation, monotonicity) are
//! scale-invariant and u32 keeps the SAT formulas small.
//!
//! Run all:   cargo kani --lib
//! Run one:   cargo kani --harness proof_stake_remove_releases_credit

// ═══════════════════════════════════════════════════════════════
// Fee Math (u32/u64 mirror of staking-ledger/src/math.rs)
// ═══════════════════════════════════════════════════════════════

pub const BPS_DENOMINATOR: u32 = 10_000;

/// Unstakeable part of a stake. floor(amount * bps / 10_000).
pub fn calc_unstakeable(amount: u32, bps: u16) -> Option<u32> {
    if bps as u32 > BPS_DENOMINATOR {
        return None;
    }
    let u = (amount as u64)
        .checked_mul(bps as u64)?
        .checked_div(BPS_DENOMINATOR as u64)?;
    Some(u as u32)
}

/// Retained by the store = amount - unstakeable.
pub fn calc_retained(amount: u32, bps: u16) -> Option<u32> {
    amount.checked_sub(calc_unstakeable(amount, bps)?)
}

pub fn exceeds_minimum(amount: u32, min: u32) -> bool {
    amount > min
}

// ═══════════════════════════════════════════════════════════════
// Staker record transitions (mirror of staking-ledger/src/ledger.rs)
// ═══════════════════════════════════════════════════════════════

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Record {
    pub exists: bool,
    pub lifetime: u32,
    pub unstakeable: u32,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Totals {
    pub stakers: u32,
    pub staked: u32,
    pub credited: u32,
    pub released: u32,
}

/// Stake `amount`; `None` means rejected with no state change.
pub fn stake(t: Totals, r: Record, amount: u32, min: u32, bps: u16) -> Option<(Totals, Record)> {
    if !exceeds_minimum(amount, min) {
        return None;
    }
    let delta = calc_unstakeable(amount, bps)?;
    let record = Record {
        exists: true,
        lifetime: r.lifetime.checked_add(amount)?,
        unstakeable: r.unstakeable.checked_add(delta)?,
    };
    let totals = Totals {
        stakers: if r.exists { t.stakers } else { t.stakers.checked_add(1)? },
        staked: t.staked.checked_add(amount)?,
        credited: t.credited.checked_add(delta)?,
        released: t.released,
    };
    Some((totals, record))
}

/// Remove all stake; returns the new state and the amount released.
pub fn remove(t: Totals, r: Record) -> Option<(Totals, Record, u32)> {
    if !r.exists {
        return None;
    }
    let released = r.unstakeable;
    let totals = Totals { released: t.released.checked_add(released)?, ..t };
    Some((totals, Record { unstakeable: 0, ..r }, released))
}

// ═══════════════════════════════════════════════════════════════
// KANI PROOFS
// ═══════════════════════════════════════════════════════════════

#[cfg(kani)]
mod proofs {
    use super::*;

    const EMPTY: Totals = Totals { stakers: 0, staked: 0, credited: 0, released: 0 };
    const NONE: Record = Record { exists: false, lifetime: 0, unstakeable: 0 };

    // ── 1. Fee Bounds ──

    #[kani::proof]
    #[kani::unwind(33)]
    fn proof_unstakeable_bounded() {
        let amount: u32 = kani::any();
        let bps: u16 = kani::any();
        kani::assume(bps <= 10_000);
        assert!(calc_unstakeable(amount, bps).unwrap() <= amount);
    }

    #[kani::proof]
    #[kani::unwind(33)]
    fn proof_split_conserves() {
        let amount: u32 = kani::any();
        let bps: u16 = kani::any();
        kani::assume(bps <= 10_000);
        let u = calc_unstakeable(amount, bps).unwrap();
        let r = calc_retained(amount, bps).unwrap();
        assert_eq!(u as u64 + r as u64, amount as u64);
    }

    #[kani::proof]
    #[kani::unwind(33)]
    fn proof_bps_over_denominator_rejected() {
        let bps: u16 = kani::any();
        kani::assume(bps > 10_000);
        assert!(calc_unstakeable(kani::any(), bps).is_none());
    }

    // ── 2. Arithmetic Safety ──

    #[kani::proof]
    #[kani::unwind(33)]
    fn proof_unstakeable_no_panic() {
        let _ = calc_unstakeable(kani::any(), kani::any());
    }

    #[kani::proof]
    #[kani::unwind(33)]
    fn proof_stake_no_panic() {
        let t = Totals {
            stakers: kani::any(), staked: kani::any(), credited: kani::any(), released: kani::any(),
        };
        let r = Record { exists: kani::any(), lifetime: kani::any(), unstakeable: kani::any() };
        let _ = stake(t, r, kani::any(), kani::any(), kani::any());
    }

    // ── 3. Minimum Gate ──

    /// Amounts at or below the minimum are rejected outright.
    #[kani::proof]
    #[kani::unwind(33)]
    fn proof_minimum_gate_strict() {
        let amount: u32 = kani::any();
        let min: u32 = kani::any();
        kani::assume(amount <= min);
        assert!(stake(EMPTY, NONE, amount, min, kani::any()).is_none());
    }

    // ── 4. Record Transitions ──

    /// First stake counts the staker once; a second stake does not.
    #[kani::proof]
    #[kani::unwind(33)]
    fn proof_staker_counted_once() {
        let a: u32 = kani::any();
        let b: u32 = kani::any();
        kani::assume(a > 5 && a < 1_000);
        kani::assume(b > 5 && b < 1_000);

        let (t1, r1) = stake(EMPTY, NONE, a, 5, 9_200).unwrap();
        assert_eq!(t1.stakers, 1);
        let (t2, r2) = stake(t1, r1, b, 5, 9_200).unwrap();
        assert_eq!(t2.stakers, 1);
        assert_eq!(r2.lifetime, a + b);
    }

    /// Stake then remove: exactly the credited amount comes back out.
    #[kani::proof]
    #[kani::unwind(33)]
    fn proof_stake_remove_releases_credit() {
        let amount: u32 = kani::any();
        let bps: u16 = kani::any();
        kani::assume(amount > 5 && amount < 1_000_000);
        kani::assume(bps <= 10_000);

        let (t, r) = stake(EMPTY, NONE, amount, 5, bps).unwrap();
        let (t, r, released) = remove(t, r).unwrap();

        assert_eq!(released, calc_unstakeable(amount, bps).unwrap());
        assert!(released <= amount);
        assert_eq!(t.credited, t.released);
        assert_eq!(r.unstakeable, 0);
        assert_eq!(r.lifetime, amount);
        assert!(r.exists);
    }

    /// A second remove releases nothing.
    #[kani::proof]
    #[kani::unwind(33)]
    fn proof_second_remove_releases_nothing() {
        let amount: u32 = kani::any();
        kani::assume(amount > 5 && amount < 1_000_000);

        let (t, r) = stake(EMPTY, NONE, amount, 5, 9_200).unwrap();
        let (t, r, _) = remove(t, r).unwrap();
        let (t2, r2, again) = remove(t, r).unwrap();
        assert_eq!(again, 0);
        assert_eq!((t2, r2), (t, r));
    }

    /// Never-staked addresses cannot remove.
    #[kani::proof]
    #[kani::unwind(33)]
    fn proof_remove_requires_stake() {
        let t = Totals {
            stakers: kani::any(), staked: kani::any(), credited: kani::any(), released: kani::any(),
        };
        assert!(remove(t, NONE).is_none());
    }

    /// The store never owes more than it received.
    #[kani::proof]
    #[kani::unwind(33)]
    fn proof_credit_never_exceeds_received() {
        let a: u32 = kani::any();
        let b: u32 = kani::any();
        let bps: u16 = kani::any();
        kani::assume(a > 5 && a < 10_000);
        kani::assume(b > 5 && b < 10_000);
        kani::assume(bps <= 10_000);

        let (t, r) = stake(EMPTY, NONE, a, 5, bps).unwrap();
        let (t, _) = stake(t, NONE, b, 5, bps).unwrap();
        assert!(t.credited <= t.staked);
        assert!(r.unstakeable <= r.lifetime);
    }
}
