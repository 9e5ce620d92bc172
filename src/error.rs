use solana_program::program_error::ProgramError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[repr(u32)]
pub enum StakeError {
    /// Ledger already initialized for this token mint
    #[error("ledger already initialized for this token mint")]
    AlreadyInitialized = 0,
    /// Ledger not initialized
    #[error("ledger not initialized")]
    NotInitialized = 1,
    /// Staker record belongs to another address or ledger
    #[error("staker record does not belong to the signer")]
    Unauthorized = 2,
    /// Stake amount does not exceed the ledger minimum
    #[error("Contributions must be over the minimum contribution amount")]
    BelowMinimumContribution = 3,
    /// RemoveStake from an address that never staked
    #[error("This address has never contributed BNB to the protocol")]
    NeverContributed = 4,
    /// Token program would reject the transfer (balance, allowance, frozen)
    #[error("token transfer rejected")]
    TransferRejected = 5,
    /// Arithmetic overflow
    #[error("arithmetic overflow")]
    Overflow = 6,
    /// Token account mint does not match the ledger mint
    #[error("token account mint does not match the ledger mint")]
    InvalidMint = 7,
    /// Invalid PDA derivation
    #[error("invalid PDA derivation")]
    InvalidPda = 8,
    /// Store account does not match the ledger store
    #[error("store account does not match the ledger store")]
    InvalidStore = 9,
    /// Fee or reward configuration out of range
    #[error("invalid ledger configuration")]
    InvalidConfig = 10,
}

impl StakeError {
    /// Map a `ProgramError::Custom` code back to its variant.
    pub fn from_code(code: u32) -> Option<Self> {
        let err = match code {
            0 => Self::AlreadyInitialized,
            1 => Self::NotInitialized,
            2 => Self::Unauthorized,
            3 => Self::BelowMinimumContribution,
            4 => Self::NeverContributed,
            5 => Self::TransferRejected,
            6 => Self::Overflow,
            7 => Self::InvalidMint,
            8 => Self::InvalidPda,
            9 => Self::InvalidStore,
            10 => Self::InvalidConfig,
            _ => return None,
        };
        Some(err)
    }
}

impl From<StakeError> for ProgramError {
    fn from(e: StakeError) -> Self {
        ProgramError::Custom(e as u32)
    }
}
