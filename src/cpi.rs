//! CPI helpers for moving stake through the SPL Token program, and for
//! creating the program's PDA accounts through the system program.
//!
//! Every transfer is pre-checked against the source token account so a
//! transfer the token program would refuse fails as `TransferRejected`
//! with a log line, instead of an opaque token-program error.

use solana_program::{
    account_info::AccountInfo,
    entrypoint::ProgramResult,
    instruction::Instruction,
    msg,
    program::{invoke, invoke_signed},
    program_error::ProgramError,
    program_option::COption,
    program_pack::Pack,
    pubkey::Pubkey,
    rent::Rent,
    system_instruction,
};
use spl_token::state::Account as TokenAccount;

use crate::error::StakeError;
use crate::ledger::TokenTransfer;

/// Check that `authority` can move `amount` of `mint` out of `source`.
///
/// The authority must be the account owner, or its approved delegate with
/// a large enough allowance.
pub fn check_source(
    source: &TokenAccount,
    authority: &Pubkey,
    mint: &Pubkey,
    amount: u64,
) -> Result<(), StakeError> {
    if source.mint != *mint {
        return Err(StakeError::InvalidMint);
    }
    if source.is_frozen() {
        return Err(StakeError::TransferRejected);
    }
    if source.amount < amount {
        return Err(StakeError::TransferRejected);
    }
    if source.owner == *authority {
        return Ok(());
    }
    match source.delegate {
        COption::Some(delegate) if delegate == *authority && source.delegated_amount >= amount => Ok(()),
        _ => Err(StakeError::TransferRejected),
    }
}

/// Unpack an SPL token account, verifying it is owned by the token program.
pub fn unpack_token_account(account: &AccountInfo) -> Result<TokenAccount, ProgramError> {
    if *account.owner != spl_token::id() {
        return Err(StakeError::TransferRejected.into());
    }
    let data = account.try_borrow_data()?;
    TokenAccount::unpack(&data).map_err(|_| StakeError::TransferRejected.into())
}

/// SPL Token `transfer` instruction (tag 3).
pub fn build_transfer_ix(
    source: &Pubkey,
    destination: &Pubkey,
    authority: &Pubkey,
    amount: u64,
) -> Result<Instruction, ProgramError> {
    spl_token::instruction::transfer(&spl_token::id(), source, destination, authority, &[], amount)
}

/// Token mover for one Stake / RemoveStake instruction.
///
/// Stake only needs the staker as authority; RemoveStake also carries the
/// store authority PDA and its signer seeds.
pub struct SplTokenTransfer<'a, 'b> {
    pub token_program: &'b AccountInfo<'a>,
    pub mint: Pubkey,
    pub staker: &'b AccountInfo<'a>,
    pub staker_token: &'b AccountInfo<'a>,
    pub store: &'b AccountInfo<'a>,
    pub store_authority: Option<(&'b AccountInfo<'a>, &'b [&'b [u8]])>,
}

impl<'a, 'b> SplTokenTransfer<'a, 'b> {
    fn check_destination(&self, destination: &AccountInfo) -> ProgramResult {
        let account = unpack_token_account(destination)?;
        if account.mint != self.mint {
            msg!("Error: destination {} holds the wrong mint", destination.key);
            return Err(StakeError::InvalidMint.into());
        }
        Ok(())
    }
}

impl<'a, 'b> TokenTransfer for SplTokenTransfer<'a, 'b> {
    fn deposit_to_store(&mut self, amount: u64) -> Result<(), ProgramError> {
        let source = unpack_token_account(self.staker_token)?;
        if let Err(e) = check_source(&source, self.staker.key, &self.mint, amount) {
            msg!("Error: stake transfer of {} from {} rejected: {}", amount, self.staker_token.key, e);
            return Err(e.into());
        }
        self.check_destination(self.store)?;

        invoke(
            &build_transfer_ix(self.staker_token.key, self.store.key, self.staker.key, amount)?,
            &[
                self.staker_token.clone(),
                self.store.clone(),
                self.staker.clone(),
                self.token_program.clone(),
            ],
        )
    }

    fn release_from_store(&mut self, amount: u64) -> Result<(), ProgramError> {
        let (store_authority, seeds) = self.store_authority
            .ok_or(StakeError::TransferRejected)?;

        let source = unpack_token_account(self.store)?;
        if let Err(e) = check_source(&source, store_authority.key, &self.mint, amount) {
            msg!("Error: release of {} from store {} rejected: {}", amount, self.store.key, e);
            return Err(e.into());
        }
        self.check_destination(self.staker_token)?;

        invoke_signed(
            &build_transfer_ix(self.store.key, self.staker_token.key, store_authority.key, amount)?,
            &[
                self.store.clone(),
                self.staker_token.clone(),
                store_authority.clone(),
                self.token_program.clone(),
            ],
            &[seeds],
        )
    }
}

// ═══════════════════════════════════════════════════════════════
// PDA account creation
// ═══════════════════════════════════════════════════════════════

/// System program instructions that turn `target` into an account of
/// `space` bytes owned by `owner`.
///
/// A target without lamports gets a single `create_account`. PDA addresses
/// are public and anyone can send lamports to them; `create_account` refuses
/// such a target, so it is topped up to `rent_minimum` and then allocated
/// and assigned instead.
pub fn build_create_pda_ixs(
    payer: &Pubkey,
    target: &Pubkey,
    owner: &Pubkey,
    space: u64,
    current_lamports: u64,
    rent_minimum: u64,
) -> Vec<Instruction> {
    if current_lamports == 0 {
        return vec![system_instruction::create_account(payer, target, rent_minimum, space, owner)];
    }

    let mut ixs = Vec::with_capacity(3);
    let missing = rent_minimum.saturating_sub(current_lamports);
    if missing > 0 {
        ixs.push(system_instruction::transfer(payer, target, missing));
    }
    ixs.push(system_instruction::allocate(target, space));
    ixs.push(system_instruction::assign(target, owner));
    ixs
}

/// Create the PDA `target`, rent-exempt at `space` bytes, owned by `owner`.
/// `seeds` are the target's signer seeds (bump included).
pub fn create_pda_account<'a>(
    payer: &AccountInfo<'a>,
    target: &AccountInfo<'a>,
    system_program: &AccountInfo<'a>,
    owner: &Pubkey,
    space: usize,
    rent: &Rent,
    seeds: &[&[u8]],
) -> ProgramResult {
    let ixs = build_create_pda_ixs(
        payer.key,
        target.key,
        owner,
        space as u64,
        target.lamports(),
        rent.minimum_balance(space),
    );
    for ix in &ixs {
        invoke_signed(
            ix,
            &[payer.clone(), target.clone(), system_program.clone()],
            &[seeds],
        )?;
    }
    Ok(())
}
