//! Staking ledger core: the Stake / RemoveStake state transitions.
//!
//! No account plumbing here. The processor hands in the ledger state, a
//! looked-up staker record and a token mover; these functions gate, compute
//! every new value, move tokens, and only then commit. An error at any step
//! leaves the ledger handle untouched and returns no record to write.

use solana_program::program_error::ProgramError;

use crate::error::StakeError;
use crate::state::{StakerLookup, StakerRecord, StakingLedger};

/// Token movements the ledger needs from the token collaborator.
///
/// On chain this is SPL Token `transfer` via CPI (`cpi::SplTokenTransfer`).
/// Any `Err` aborts the enclosing operation.
pub trait TokenTransfer {
    /// Move `amount` from the staker's token account into the store.
    fn deposit_to_store(&mut self, amount: u64) -> Result<(), ProgramError>;

    /// Move `amount` from the store back to the staker's token account.
    fn release_from_store(&mut self, amount: u64) -> Result<(), ProgramError>;
}

/// Successful RemoveStake: the record to write back and what left the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unstaked {
    pub record: StakerRecord,
    pub released: u64,
}

/// Stake `amount` for the looked-up staker.
///
/// First stake creates the record (`exists = 1`) and bumps `staker_count`.
/// Repeat stakes accumulate: `contribution` and `unstakeable` grow by the
/// new stake's unstakeable part, `lifetime_contribution` by the full amount.
///
/// Returns the record to persist.
pub fn stake<T: TokenTransfer>(
    ledger: &mut StakingLedger,
    lookup: StakerLookup,
    amount: u64,
    token: &mut T,
) -> Result<StakerRecord, ProgramError> {
    if ledger.is_initialized != 1 {
        return Err(StakeError::NotInitialized.into());
    }
    if !crate::math::exceeds_minimum(amount, ledger.min_contribution) {
        return Err(StakeError::BelowMinimumContribution.into());
    }

    let unstakeable_delta = ledger.calc_unstakeable(amount)
        .ok_or(StakeError::Overflow)?;

    let mut record = match lookup {
        StakerLookup::Found(record) => record,
        StakerLookup::NotFound { ledger, staker, bump } => StakerRecord::new(ledger, staker, bump),
    };
    let is_new = !record.is_staker();

    record.lifetime_contribution = record.lifetime_contribution.checked_add(amount)
        .ok_or(StakeError::Overflow)?;
    record.contribution = record.contribution.checked_add(unstakeable_delta)
        .ok_or(StakeError::Overflow)?;
    record.unstakeable = record.unstakeable.checked_add(unstakeable_delta)
        .ok_or(StakeError::Overflow)?;
    record.exists = 1;

    let staker_count = if is_new {
        ledger.staker_count.checked_add(1).ok_or(StakeError::Overflow)?
    } else {
        ledger.staker_count
    };
    let total_staked = ledger.total_staked.checked_add(amount)
        .ok_or(StakeError::Overflow)?;
    let total_credited = ledger.total_credited.checked_add(unstakeable_delta)
        .ok_or(StakeError::Overflow)?;

    token.deposit_to_store(amount)?;

    ledger.staker_count = staker_count;
    ledger.total_staked = total_staked;
    ledger.total_credited = total_credited;

    Ok(record)
}

/// Pay the staker's whole unstakeable balance out of the store.
///
/// Zeroes `contribution` and `unstakeable`; history (`lifetime_contribution`,
/// `accrued_yield`, `exists`) stays. With nothing withdrawable the call is a
/// no-op that moves no tokens.
pub fn remove_stake<T: TokenTransfer>(
    ledger: &mut StakingLedger,
    lookup: StakerLookup,
    token: &mut T,
) -> Result<Unstaked, ProgramError> {
    if ledger.is_initialized != 1 {
        return Err(StakeError::NotInitialized.into());
    }

    let mut record = match lookup {
        StakerLookup::Found(record) if record.is_staker() => record,
        _ => return Err(StakeError::NeverContributed.into()),
    };

    let released = record.unstakeable;
    let total_released = ledger.total_released.checked_add(released)
        .ok_or(StakeError::Overflow)?;

    if released > 0 {
        token.release_from_store(released)?;
    }

    record.contribution = 0;
    record.unstakeable = 0;
    ledger.total_released = total_released;

    Ok(Unstaked { record, released })
}
