//! Staking Ledger Program
//!
//! Holders of an SPL token lock value into a pooled custody account (the
//! "store"). The ledger keeps one record per staker with its lifetime
//! contribution history and derives a withdrawal-eligible ("unstakeable")
//! balance from every stake via a basis-point fee. The store itself is held
//! by an external custodian; the ledger only moves tokens in and out of it.
//!
//! Architecture:
//! - One StakingLedger PDA per token mint: config (minimum, fee, reward
//!   percent, store) plus aggregate counters (staker count, totals)
//! - One StakerRecord PDA per (ledger, staker), created by the first Stake
//! - `ledger` holds the state transitions, generic over a `TokenTransfer`
//!   mover; `cpi` implements that mover with SPL Token transfers
//! - Releases are signed by the store authority PDA, which the custodian
//!   sets as owner or approved delegate of the store
//! - Yield: `accrued_yield` and `reward_percent` are stored but no accrual
//!   formula exists yet
//!
//! Instructions:
//!   0 - InitLedger:   Create the ledger for a mint, fix owner and config
//!   1 - Stake:        Move tokens to the store, credit the unstakeable part
//!   2 - RemoveStake:  Pay the unstakeable balance back, keep history

pub mod error;
pub mod instruction;
pub mod ledger;
pub mod math;
pub mod processor;
pub mod state;
pub mod cpi;

#[cfg(not(feature = "no-entrypoint"))]
mod entrypoint;
