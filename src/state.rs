use bytemuck::{Pod, Zeroable};
use solana_program::pubkey::Pubkey;

/// Observed minimum stake; a stake must be strictly above it.
pub const DEFAULT_MIN_CONTRIBUTION: u64 = 5;

/// Observed unstakeable share: 92% of every stake stays withdrawable.
pub const DEFAULT_UNSTAKEABLE_FEE_BPS: u16 = 9_200;

/// Observed reward percent. Stored and validated only, no accrual uses it.
pub const DEFAULT_REWARD_PERCENT: u16 = 50;

/// Upper bound for `reward_percent`.
pub const MAX_REWARD_PERCENT: u16 = 100;

/// Staking ledger state: one per token mint.
/// PDA seeds: [b"staking_ledger", token_mint]
///
/// Holds the ledger configuration (fixed at InitLedger) and the aggregate
/// counters. Per-staker state lives in `StakerRecord` PDAs keyed by
/// (ledger, staker); together those form the staker mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct StakingLedger {
    /// Whether the ledger is initialized (1 = yes, 0 = no)
    pub is_initialized: u8,

    /// Bump seed for the ledger PDA
    pub bump: u8,

    /// Bump seed for the store authority PDA
    pub store_authority_bump: u8,

    /// Padding for alignment
    pub _padding: [u8; 5],

    /// Administrative owner, fixed at construction
    pub owner: [u8; 32],

    /// Staked token mint
    pub token_mint: [u8; 32],

    /// Custody token account holding staked tokens
    pub store: [u8; 32],

    /// Distinct addresses that completed at least one stake
    pub staker_count: u64,

    /// Stakes must be strictly greater than this
    pub min_contribution: u64,

    /// Sum of every successful stake (lifetime)
    pub total_staked: u64,

    /// Sum of every unstakeable amount credited to stakers (lifetime)
    pub total_credited: u64,

    /// Sum of every amount paid back out of the store (lifetime)
    pub total_released: u64,

    /// Share of each stake credited as unstakeable, in bps
    pub unstakeable_fee_bps: u16,

    /// Reward percent. No yield accrual is implemented on top of it.
    pub reward_percent: u16,

    /// Padding
    pub _padding2: [u8; 4],

    /// Reserved for future use
    pub _reserved: [u8; 64],
}

/// Size of StakingLedger in bytes
pub const STAKING_LEDGER_SIZE: usize = core::mem::size_of::<StakingLedger>();

/// Per-staker record.
/// PDA seeds: [b"staker", ledger_pda, staker_pubkey]
///
/// The account is created by the first successful Stake and never closed:
/// RemoveStake zeroes the withdrawable fields but keeps the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct StakerRecord {
    /// 1 once the address completed a stake; never reverts to 0
    pub exists: u8,

    /// Bump seed for the record PDA
    pub bump: u8,

    /// Padding
    pub _padding: [u8; 6],

    /// Ledger this record belongs to
    pub ledger: [u8; 32],

    /// The staker address
    pub staker: [u8; 32],

    /// Total ever staked; never decreases
    pub lifetime_contribution: u64,

    /// Current eligible-for-removal balance
    pub contribution: u64,

    /// Reward balance. Always 0: yield accrual is an unimplemented extension point.
    pub accrued_yield: u64,

    /// Currently withdrawable balance; equals `contribution`
    pub unstakeable: u64,

    /// Reserved for future use
    pub _reserved: [u8; 32],
}

/// Size of StakerRecord in bytes
pub const STAKER_RECORD_SIZE: usize = core::mem::size_of::<StakerRecord>();

impl StakingLedger {
    pub fn owner_pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.owner)
    }

    pub fn token_mint_pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.token_mint)
    }

    pub fn store_pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.store)
    }

    /// Number of distinct addresses that have ever staked.
    pub fn staker_count(&self) -> u64 {
        self.staker_count
    }

    /// Unstakeable amount for a stake under this ledger's fee.
    /// Delegates to pure math module (Kani-verified).
    pub fn calc_unstakeable(&self, amount: u64) -> Option<u64> {
        crate::math::calc_unstakeable(amount, self.unstakeable_fee_bps)
    }

    /// Tokens the store still owes to stakers.
    pub fn outstanding(&self) -> Option<u64> {
        crate::math::store_outstanding(self.total_credited, self.total_released)
    }
}

impl StakerRecord {
    /// Zero-valued record bound to (ledger, staker). `exists` stays 0 until a stake lands.
    pub fn new(ledger: [u8; 32], staker: [u8; 32], bump: u8) -> Self {
        let mut record = Self::zeroed();
        record.ledger = ledger;
        record.staker = staker;
        record.bump = bump;
        record
    }

    pub fn staker_pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.staker)
    }

    pub fn ledger_pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.ledger)
    }

    pub fn is_staker(&self) -> bool {
        self.exists == 1
    }
}

/// Result of looking up a staker record before a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StakerLookup {
    /// The record account holds data
    Found(StakerRecord),
    /// No record yet; carries what a new record gets bound to
    NotFound {
        ledger: [u8; 32],
        staker: [u8; 32],
        bump: u8,
    },
}

impl StakerLookup {
    /// Read the record account data for (ledger, staker).
    ///
    /// Empty or all-zero data is `NotFound`. Data bound to a different ledger
    /// or staker is rejected.
    pub fn load(
        data: &[u8],
        ledger: &Pubkey,
        staker: &Pubkey,
        bump: u8,
    ) -> Result<Self, crate::error::StakeError> {
        let record = load_staker(data);
        if record == StakerRecord::zeroed() {
            return Ok(Self::NotFound {
                ledger: ledger.to_bytes(),
                staker: staker.to_bytes(),
                bump,
            });
        }
        if record.ledger != ledger.to_bytes() || record.staker != staker.to_bytes() {
            return Err(crate::error::StakeError::Unauthorized);
        }
        Ok(Self::Found(record))
    }
}

/// Decode a staker record from account data.
///
/// Missing or short data reads as the zero-valued record (`exists == 0`),
/// which is what a never-staked address reports.
pub fn load_staker(data: &[u8]) -> StakerRecord {
    if data.len() < STAKER_RECORD_SIZE {
        return StakerRecord::zeroed();
    }
    bytemuck::pod_read_unaligned(&data[..STAKER_RECORD_SIZE])
}

/// Decode ledger state from account data. `None` if the data is too short.
pub fn load_ledger(data: &[u8]) -> Option<StakingLedger> {
    if data.len() < STAKING_LEDGER_SIZE {
        return None;
    }
    Some(bytemuck::pod_read_unaligned(&data[..STAKING_LEDGER_SIZE]))
}

/// Derive the ledger PDA for a token mint.
pub fn derive_ledger_pda(program_id: &Pubkey, token_mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[b"staking_ledger", token_mint.as_ref()], program_id)
}

/// Derive the store authority PDA for a ledger.
/// The custodian makes it the owner or approved delegate of the store.
pub fn derive_store_authority(program_id: &Pubkey, ledger: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[b"store_auth", ledger.as_ref()], program_id)
}

/// Derive the per-staker record PDA.
pub fn derive_staker_pda(program_id: &Pubkey, ledger: &Pubkey, staker: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[b"staker", ledger.as_ref(), staker.as_ref()], program_id)
}
