use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program_error::ProgramError,
    pubkey::Pubkey,
    rent::Rent,
    sysvar::Sysvar,
};

/// Verify the token program is the real SPL Token program.
/// CRITICAL: the store authority PDA signs releases; a fake token program
/// handed that signature could drain the store.
fn verify_token_program(token_program: &AccountInfo) -> ProgramResult {
    if *token_program.key != spl_token::id() {
        msg!("Error: invalid token program {}", token_program.key);
        return Err(ProgramError::IncorrectProgramId);
    }
    Ok(())
}

use crate::cpi::{self, SplTokenTransfer};
use crate::error::StakeError;
use crate::instruction::StakeInstruction;
use crate::ledger;
use crate::math;
use crate::state::{
    self, StakerLookup, StakingLedger, MAX_REWARD_PERCENT, STAKER_RECORD_SIZE,
    STAKING_LEDGER_SIZE,
};

pub fn process(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    let instruction = StakeInstruction::unpack(instruction_data)?;

    let result = match instruction {
        StakeInstruction::InitLedger { min_contribution, unstakeable_fee_bps, reward_percent } => {
            process_init_ledger(program_id, accounts, min_contribution, unstakeable_fee_bps, reward_percent)
        }
        StakeInstruction::Stake { amount } => {
            process_stake(program_id, accounts, amount)
        }
        StakeInstruction::RemoveStake => {
            process_remove_stake(program_id, accounts)
        }
    };

    if let Err(ProgramError::Custom(code)) = &result {
        if let Some(e) = StakeError::from_code(*code) {
            msg!("Error: {}", e);
        }
    }
    result
}

/// Check the ledger account is the initialized, program-owned ledger PDA of its mint.
fn check_ledger(program_id: &Pubkey, ledger_pda: &AccountInfo, ledger: &StakingLedger) -> ProgramResult {
    if ledger_pda.owner != program_id {
        return Err(ProgramError::IncorrectProgramId);
    }
    if ledger.is_initialized != 1 {
        return Err(StakeError::NotInitialized.into());
    }
    let (expected_ledger, _) = state::derive_ledger_pda(program_id, &ledger.token_mint_pubkey());
    if *ledger_pda.key != expected_ledger {
        return Err(StakeError::InvalidPda.into());
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════
// 0: InitLedger
// ═══════════════════════════════════════════════════════════════

fn process_init_ledger(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    min_contribution: u64,
    unstakeable_fee_bps: u16,
    reward_percent: u16,
) -> ProgramResult {
    let accounts_iter = &mut accounts.iter();

    let owner = next_account_info(accounts_iter)?;
    let ledger_pda = next_account_info(accounts_iter)?;
    let token_mint = next_account_info(accounts_iter)?;
    let store = next_account_info(accounts_iter)?;
    let system_program = next_account_info(accounts_iter)?;

    if !owner.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }

    if unstakeable_fee_bps as u64 > math::BPS_DENOMINATOR || reward_percent > MAX_REWARD_PERCENT {
        return Err(StakeError::InvalidConfig.into());
    }

    // Derive and verify ledger PDA
    let (expected_ledger, ledger_bump) = state::derive_ledger_pda(program_id, token_mint.key);
    if *ledger_pda.key != expected_ledger {
        return Err(StakeError::InvalidPda.into());
    }

    if !ledger_pda.data_is_empty() {
        return Err(StakeError::AlreadyInitialized.into());
    }

    // Store must be a token account of this mint; its custodian delegates later
    let store_account = cpi::unpack_token_account(store)
        .map_err(|_| ProgramError::from(StakeError::InvalidStore))?;
    if store_account.mint != *token_mint.key {
        return Err(StakeError::InvalidMint.into());
    }

    let (store_authority, store_authority_bump) = state::derive_store_authority(program_id, &expected_ledger);

    let rent = Rent::get()?;
    let ledger_seeds: &[&[u8]] = &[b"staking_ledger", token_mint.key.as_ref(), &[ledger_bump]];
    cpi::create_pda_account(
        owner,
        ledger_pda,
        system_program,
        program_id,
        STAKING_LEDGER_SIZE,
        &rent,
        ledger_seeds,
    )?;

    let mut ledger_data = ledger_pda.try_borrow_mut_data()?;
    let ledger: &mut StakingLedger = bytemuck::from_bytes_mut(&mut ledger_data[..STAKING_LEDGER_SIZE]);

    ledger.is_initialized = 1;
    ledger.bump = ledger_bump;
    ledger.store_authority_bump = store_authority_bump;
    ledger.owner = owner.key.to_bytes();
    ledger.token_mint = token_mint.key.to_bytes();
    ledger.store = store.key.to_bytes();
    ledger.staker_count = 0;
    ledger.min_contribution = min_contribution;
    ledger.total_staked = 0;
    ledger.total_credited = 0;
    ledger.total_released = 0;
    ledger.unstakeable_fee_bps = unstakeable_fee_bps;
    ledger.reward_percent = reward_percent;

    msg!(
        "StakingLedger initialized for mint {} (store {}, store authority {}, min {}, unstakeable {} bps)",
        token_mint.key,
        store.key,
        store_authority,
        min_contribution,
        unstakeable_fee_bps,
    );
    Ok(())
}

// ═══════════════════════════════════════════════════════════════
// 1: Stake
// ═══════════════════════════════════════════════════════════════

fn process_stake(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    amount: u64,
) -> ProgramResult {
    let accounts_iter = &mut accounts.iter();

    let staker = next_account_info(accounts_iter)?;
    let ledger_pda = next_account_info(accounts_iter)?;
    let staker_pda = next_account_info(accounts_iter)?;
    let staker_token = next_account_info(accounts_iter)?;
    let store = next_account_info(accounts_iter)?;
    let token_program = next_account_info(accounts_iter)?;
    let system_program = next_account_info(accounts_iter)?;

    if !staker.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }

    let mut ledger_data = ledger_pda.try_borrow_mut_data()?;
    if ledger_data.len() < STAKING_LEDGER_SIZE {
        return Err(StakeError::NotInitialized.into());
    }
    let ledger: &mut StakingLedger = bytemuck::from_bytes_mut(&mut ledger_data[..STAKING_LEDGER_SIZE]);

    check_ledger(program_id, ledger_pda, ledger)?;
    if ledger.store != store.key.to_bytes() {
        return Err(StakeError::InvalidStore.into());
    }

    verify_token_program(token_program)?;

    let (expected_staker_pda, staker_bump) = state::derive_staker_pda(program_id, ledger_pda.key, staker.key);
    if *staker_pda.key != expected_staker_pda {
        return Err(StakeError::InvalidPda.into());
    }

    // Copy the lookup out so the record account is free for create_account below
    let lookup = {
        let data = staker_pda.try_borrow_data()?;
        StakerLookup::load(&data, ledger_pda.key, staker.key, staker_bump)?
    };
    let is_new = matches!(lookup, StakerLookup::NotFound { .. });

    let mut token = SplTokenTransfer {
        token_program,
        mint: ledger.token_mint_pubkey(),
        staker,
        staker_token,
        store,
        store_authority: None,
    };
    let record = ledger::stake(ledger, lookup, amount, &mut token)?;

    if staker_pda.data_is_empty() {
        let staker_seeds: &[&[u8]] = &[
            b"staker", ledger_pda.key.as_ref(), staker.key.as_ref(), &[staker_bump],
        ];
        // May already hold lamports sent by anyone; create_pda_account tops up
        let rent = Rent::get()?;
        cpi::create_pda_account(
            staker,
            staker_pda,
            system_program,
            program_id,
            STAKER_RECORD_SIZE,
            &rent,
            staker_seeds,
        )?;
    } else if staker_pda.owner != program_id {
        return Err(ProgramError::IncorrectProgramId);
    }

    let mut record_data = staker_pda.try_borrow_mut_data()?;
    record_data[..STAKER_RECORD_SIZE].copy_from_slice(bytemuck::bytes_of(&record));

    msg!(
        "Staked {} ({} unstakeable, lifetime {}){}; stakers: {}",
        amount,
        record.unstakeable,
        record.lifetime_contribution,
        if is_new { ", new staker" } else { "" },
        ledger.staker_count,
    );
    Ok(())
}

// ═══════════════════════════════════════════════════════════════
// 2: RemoveStake
// ═══════════════════════════════════════════════════════════════

fn process_remove_stake(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
) -> ProgramResult {
    let accounts_iter = &mut accounts.iter();

    let staker = next_account_info(accounts_iter)?;
    let ledger_pda = next_account_info(accounts_iter)?;
    let staker_pda = next_account_info(accounts_iter)?;
    let staker_token = next_account_info(accounts_iter)?;
    let store = next_account_info(accounts_iter)?;
    let store_authority = next_account_info(accounts_iter)?;
    let token_program = next_account_info(accounts_iter)?;

    if !staker.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }

    let mut ledger_data = ledger_pda.try_borrow_mut_data()?;
    if ledger_data.len() < STAKING_LEDGER_SIZE {
        return Err(StakeError::NotInitialized.into());
    }
    let ledger: &mut StakingLedger = bytemuck::from_bytes_mut(&mut ledger_data[..STAKING_LEDGER_SIZE]);

    check_ledger(program_id, ledger_pda, ledger)?;
    if ledger.store != store.key.to_bytes() {
        return Err(StakeError::InvalidStore.into());
    }

    // Validate token program BEFORE any invoke_signed that grants PDA signer authority
    verify_token_program(token_program)?;

    let (expected_staker_pda, staker_bump) = state::derive_staker_pda(program_id, ledger_pda.key, staker.key);
    if *staker_pda.key != expected_staker_pda {
        return Err(StakeError::InvalidPda.into());
    }
    if !staker_pda.data_is_empty() && staker_pda.owner != program_id {
        return Err(ProgramError::IncorrectProgramId);
    }

    let lookup = {
        let data = staker_pda.try_borrow_data()?;
        StakerLookup::load(&data, ledger_pda.key, staker.key, staker_bump)?
    };

    let (expected_store_authority, store_authority_bump) = state::derive_store_authority(program_id, ledger_pda.key);
    if *store_authority.key != expected_store_authority {
        return Err(StakeError::InvalidPda.into());
    }
    let store_authority_seeds: &[&[u8]] = &[b"store_auth", ledger_pda.key.as_ref(), &[store_authority_bump]];

    let mut token = SplTokenTransfer {
        token_program,
        mint: ledger.token_mint_pubkey(),
        staker,
        staker_token,
        store,
        store_authority: Some((store_authority, store_authority_seeds)),
    };
    let unstaked = ledger::remove_stake(ledger, lookup, &mut token)?;

    let mut record_data = staker_pda.try_borrow_mut_data()?;
    record_data[..STAKER_RECORD_SIZE].copy_from_slice(bytemuck::bytes_of(&unstaked.record));

    msg!(
        "Removed stake: released {} to {} (lifetime {} kept)",
        unstaked.released,
        staker_token.key,
        unstaked.record.lifetime_contribution,
    );
    Ok(())
}
