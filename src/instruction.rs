use solana_program::program_error::ProgramError;

/// Instructions for the staking ledger program.
#[derive(Debug)]
pub enum StakeInstruction {
    /// Create the staking ledger for a token mint.
    /// The signer becomes the (immutable) owner.
    ///
    /// Accounts:
    ///   0. `[signer, writable]` Owner (pays rent)
    ///   1. `[writable]` Ledger PDA (staking_ledger, to be created)
    ///   2. `[]` Token mint
    ///   3. `[]` Store token account (custody, mint must match)
    ///   4. `[]` System program
    InitLedger {
        min_contribution: u64,
        unstakeable_fee_bps: u16,
        reward_percent: u16,
    },

    /// Stake tokens into the store. Creates the staker record on first stake.
    ///
    /// Accounts:
    ///   0. `[signer, writable]` Staker (token authority, pays rent for the record)
    ///   1. `[writable]` Ledger PDA
    ///   2. `[writable]` Staker record PDA (created if needed)
    ///   3. `[writable]` Staker token account (source)
    ///   4. `[writable]` Store token account (destination)
    ///   5. `[]` Token program
    ///   6. `[]` System program
    Stake { amount: u64 },

    /// Pay the staker's unstakeable balance back out of the store.
    ///
    /// Accounts:
    ///   0. `[signer]` Staker
    ///   1. `[writable]` Ledger PDA
    ///   2. `[writable]` Staker record PDA
    ///   3. `[writable]` Staker token account (destination)
    ///   4. `[writable]` Store token account (source)
    ///   5. `[]` Store authority PDA (owner or delegate of the store)
    ///   6. `[]` Token program
    RemoveStake,
}

impl StakeInstruction {
    pub fn unpack(data: &[u8]) -> Result<Self, ProgramError> {
        let (&tag, rest) = data.split_first().ok_or(ProgramError::InvalidInstructionData)?;

        match tag {
            0 => {
                // InitLedger: min_contribution(8) + unstakeable_fee_bps(2) + reward_percent(2)
                if rest.len() < 12 {
                    return Err(ProgramError::InvalidInstructionData);
                }
                let min_contribution = u64::from_le_bytes(rest[0..8].try_into().unwrap());
                let unstakeable_fee_bps = u16::from_le_bytes(rest[8..10].try_into().unwrap());
                let reward_percent = u16::from_le_bytes(rest[10..12].try_into().unwrap());
                Ok(Self::InitLedger { min_contribution, unstakeable_fee_bps, reward_percent })
            }
            1 => {
                if rest.len() < 8 {
                    return Err(ProgramError::InvalidInstructionData);
                }
                let amount = u64::from_le_bytes(rest[0..8].try_into().unwrap());
                Ok(Self::Stake { amount })
            }
            2 => Ok(Self::RemoveStake),
            _ => Err(ProgramError::InvalidInstructionData),
        }
    }

    /// Encode to the wire format `unpack` reads.
    pub fn pack(&self) -> Vec<u8> {
        match self {
            Self::InitLedger { min_contribution, unstakeable_fee_bps, reward_percent } => {
                let mut data = Vec::with_capacity(13);
                data.push(0);
                data.extend_from_slice(&min_contribution.to_le_bytes());
                data.extend_from_slice(&unstakeable_fee_bps.to_le_bytes());
                data.extend_from_slice(&reward_percent.to_le_bytes());
                data
            }
            Self::Stake { amount } => {
                let mut data = Vec::with_capacity(9);
                data.push(1);
                data.extend_from_slice(&amount.to_le_bytes());
                data
            }
            Self::RemoveStake => vec![2],
        }
    }
}
